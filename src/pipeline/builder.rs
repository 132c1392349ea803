use std::sync::Arc;

use crate::config::{Properties, ResourceSettings, Settings};
use crate::error::{MessagingError, Result};
use crate::filler::{EveryFiller, MessageAwareFiller, PropertiesFiller, SubjectFiller};
use crate::resource::ResourceResolverBuilder;
use crate::sender::MessageSender;
use crate::template::TemplateParserBuilder;
use crate::translator::{
    AttachImageInliner, Base64ImageInliner, ContentTranslator, CssInliningTranslator,
    FirstSupportingMimeTypeProvider, ImageInliningTranslator, MimeTypeProvider,
    TemplateContentTranslator,
};

use super::{MessagePipeline, MessagingService};

/// Configures image inlining. Attachment and base64 modes are enabled
/// independently; without any mode no image is touched.
pub struct ImageInliningBuilder {
    resolvers: ResourceResolverBuilder,
    attach: bool,
    base64: bool,
    mimetypes: Option<Arc<dyn MimeTypeProvider>>,
    default_mimetype: Option<String>,
}

impl ImageInliningBuilder {
    pub fn new(resolvers: ResourceResolverBuilder) -> Self {
        Self {
            resolvers,
            attach: false,
            base64: false,
            mimetypes: None,
            default_mimetype: None,
        }
    }

    pub fn attach(mut self) -> Self {
        self.attach = true;
        self
    }

    pub fn base64(mut self) -> Self {
        self.base64 = true;
        self
    }

    /// Replace the standard mimetype detection (magic bytes then extension)
    pub fn mimetypes(mut self, provider: Arc<dyn MimeTypeProvider>) -> Self {
        self.mimetypes = Some(provider);
        self
    }

    /// Mimetype used when the standard detection fails
    pub fn default_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.default_mimetype = Some(mimetype.into());
        self
    }

    pub fn build(self) -> ImageInliningTranslator {
        let mimetypes: Arc<dyn MimeTypeProvider> = match self.mimetypes {
            Some(provider) => provider,
            None => Arc::new(FirstSupportingMimeTypeProvider::standard(self.default_mimetype)),
        };
        let mut translator = ImageInliningTranslator::new(Arc::new(self.resolvers.build()), mimetypes);
        if self.attach {
            translator = translator.with_attach(Arc::new(AttachImageInliner));
        }
        if self.base64 {
            translator = translator.with_base64(Arc::new(Base64ImageInliner));
        }
        translator
    }
}

/// Assembles the [`MessagingService`].
///
/// Nothing is enabled implicitly: each feature is switched on by its method,
/// or all at once from settings with [`from_settings`](Self::from_settings).
pub struct MessagingBuilder {
    templates: Option<TemplateParserBuilder>,
    subject: bool,
    css: Option<ResourceResolverBuilder>,
    images: Option<ImageInliningBuilder>,
    properties: Properties,
    prefixes: Vec<String>,
    senders: Vec<Arc<dyn MessageSender>>,
}

impl Default for MessagingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MessagingBuilder {
    pub fn new() -> Self {
        Self {
            templates: None,
            subject: false,
            css: None,
            images: None,
            properties: Properties::default(),
            prefixes: Vec::new(),
            senders: Vec::new(),
        }
    }

    /// Every feature enabled as configured in the settings
    pub fn from_settings(settings: &Settings) -> Self {
        let messaging = &settings.messaging;
        let properties = settings.properties().clone();
        let resolvers = || resolvers_from_settings(&messaging.resources);

        let mut builder = Self::new()
            .properties(properties.clone())
            .properties_prefix(messaging.properties_prefix.clone())
            .subject(true);

        if messaging.template.enabled {
            let mut templates = TemplateParserBuilder::new()
                .use_defaults(properties)
                .resolvers(resolvers());
            if let Some(prefix) = &messaging.template.prefix {
                templates = templates.parent_path(prefix.clone());
            }
            if let Some(suffix) = &messaging.template.suffix {
                templates = templates.extension(suffix.clone());
            }
            builder = builder.templates(templates);
        }

        if messaging.css.enabled {
            builder = builder.css(resolvers());
        }

        let images = &messaging.images;
        if images.attach || images.base64 {
            let mut inlining = ImageInliningBuilder::new(resolvers());
            if images.attach {
                inlining = inlining.attach();
            }
            if images.base64 {
                inlining = inlining.base64();
            }
            if let Some(mimetype) = &images.default_mimetype {
                inlining = inlining.default_mimetype(mimetype.clone());
            }
            builder = builder.images(inlining);
        }

        builder
    }

    pub fn templates(mut self, templates: TemplateParserBuilder) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Extract the email subject from the content
    pub fn subject(mut self, enabled: bool) -> Self {
        self.subject = enabled;
        self
    }

    /// Inline stylesheets, loading linked ones through these resolvers
    pub fn css(mut self, resolvers: ResourceResolverBuilder) -> Self {
        self.css = Some(resolvers);
        self
    }

    pub fn images(mut self, images: ImageInliningBuilder) -> Self {
        self.images = Some(images);
        self
    }

    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Fill recipients and sender from `<prefix>.*` properties. Several
    /// prefixes may be registered, they apply in order.
    pub fn properties_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    pub fn sender(mut self, sender: Arc<dyn MessageSender>) -> Self {
        self.senders.push(sender);
        self
    }

    /// Build the preparation pipeline alone
    pub fn build_pipeline(self) -> Result<MessagePipeline> {
        let templates = match self.templates {
            Some(builder) => {
                let parser = builder.build()?;
                Some(Arc::new(TemplateContentTranslator::new(parser)) as Arc<dyn ContentTranslator>)
            }
            None => None,
        };

        let css = self.css.map(|resolvers| {
            Arc::new(CssInliningTranslator::new(Arc::new(resolvers.build()))) as Arc<dyn ContentTranslator>
        });

        let images = self.images.map(|builder| {
            let translator = builder.build();
            tracing::info!(modes = ?translator.enabled_modes(), "Image inlining enabled");
            Arc::new(translator) as Arc<dyn ContentTranslator>
        });

        let mut fillers = EveryFiller::new();
        for prefix in &self.prefixes {
            fillers = fillers
                .with(PropertiesFiller::new(self.properties.clone(), prefix.clone()))
                .with(MessageAwareFiller::new(self.properties.clone(), prefix.clone()));
        }

        let subject = self.subject.then(SubjectFiller::default);

        let pipeline = MessagePipeline::new(templates, subject, css, images, fillers);
        tracing::info!(stages = ?pipeline.stages(), "Message pipeline built");
        Ok(pipeline)
    }

    pub fn build(mut self) -> Result<MessagingService> {
        let senders = std::mem::take(&mut self.senders);
        if senders.is_empty() {
            return Err(MessagingError::Configuration(
                "No message sender registered".to_string(),
            ));
        }

        let names: Vec<_> = senders.iter().map(|s| s.name()).collect();
        let pipeline = self.build_pipeline()?;
        tracing::info!(senders = ?names, "Messaging service built");
        Ok(MessagingService::new(pipeline, senders))
    }
}

fn resolvers_from_settings(resources: &ResourceSettings) -> ResourceResolverBuilder {
    ResourceResolverBuilder::new()
        .classpath(["classpath"], resources.classpath_roots.clone())
        .file(["file"], resources.base_dir.clone())
        .string(["string", "s"])
        .default_lookup("classpath")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineStage;
    use crate::sender::InMemorySender;

    #[test]
    fn test_no_sender_is_a_configuration_error() {
        let err = MessagingBuilder::new().build().err().unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_template_without_engine_is_a_configuration_error() {
        let err = MessagingBuilder::new()
            .templates(TemplateParserBuilder::new())
            .sender(Arc::new(InMemorySender::new()))
            .build()
            .err()
            .unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_stages_from_settings() {
        let pipeline = MessagingBuilder::from_settings(&Settings::default())
            .build_pipeline()
            .unwrap();
        assert_eq!(
            pipeline.stages(),
            vec![
                PipelineStage::Template,
                PipelineStage::Subject,
                PipelineStage::Css,
                PipelineStage::Images,
                PipelineStage::Properties,
            ]
        );
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = MessagingBuilder::new().build_pipeline().unwrap();
        assert!(pipeline.stages().is_empty());
    }
}
