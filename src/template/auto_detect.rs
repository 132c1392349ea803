use std::sync::Arc;

use crate::message::Content;
use crate::resource::{ResourceReference, ResourceResolver};

use super::{
    TemplateContext, TemplateEngineDetector, TemplateError, TemplateParser, TemplateResult,
};

/// An engine's parser together with the detector guarding it
pub(super) struct DetectedParser {
    pub engine: &'static str,
    pub detector: Box<dyn TemplateEngineDetector>,
    pub parser: Arc<dyn TemplateParser>,
}

/// Selects the engine for each template at parse time.
///
/// Detectors are asked in registration order and the first one accepting the
/// template wins, even when a later detector would accept it too.
pub struct AutoDetectTemplateParser {
    resolver: Arc<dyn ResourceResolver>,
    parsers: Vec<DetectedParser>,
}

impl AutoDetectTemplateParser {
    pub(super) fn new(resolver: Arc<dyn ResourceResolver>, parsers: Vec<DetectedParser>) -> Self {
        Self { resolver, parsers }
    }

    /// Engine names in detection order
    pub fn engines(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.engine).collect()
    }

    fn detect(
        &self,
        reference: &ResourceReference,
        ctx: &TemplateContext,
    ) -> TemplateResult<&DetectedParser> {
        for candidate in &self.parsers {
            // Detector failures abort detection, later engines are not tried
            if candidate
                .detector
                .can_parse(reference, ctx, self.resolver.as_ref())?
            {
                return Ok(candidate);
            }
            tracing::trace!(
                reference = %reference,
                engine = candidate.engine,
                "Engine declined template"
            );
        }

        Err(TemplateError::NoEngineAvailable {
            reference: reference.to_string(),
        })
    }
}

impl TemplateParser for AutoDetectTemplateParser {
    #[tracing::instrument(name = "template.auto_detect", skip(self, ctx))]
    fn parse(&self, reference: &str, ctx: &TemplateContext) -> TemplateResult<Content> {
        let parsed = ResourceReference::parse(reference);
        let selected = self.detect(&parsed, ctx)?;

        tracing::debug!(
            reference = %reference,
            engine = selected.engine,
            "Template engine selected"
        );

        selected.parser.parse(reference, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ResourceError, StringResolver};
    use crate::template::FixedEngineDetector;

    struct Named(&'static str);

    impl TemplateParser for Named {
        fn parse(&self, _reference: &str, _ctx: &TemplateContext) -> TemplateResult<Content> {
            Ok(Content::text(self.0))
        }
    }

    struct Never;

    impl TemplateEngineDetector for Never {
        fn can_parse(
            &self,
            _reference: &ResourceReference,
            _ctx: &TemplateContext,
            _resolver: &dyn ResourceResolver,
        ) -> TemplateResult<bool> {
            Ok(false)
        }
    }

    struct Failing;

    impl TemplateEngineDetector for Failing {
        fn can_parse(
            &self,
            reference: &ResourceReference,
            _ctx: &TemplateContext,
            _resolver: &dyn ResourceResolver,
        ) -> TemplateResult<bool> {
            Err(TemplateError::EngineDetection {
                reference: reference.to_string(),
                source: ResourceError::NotFound {
                    reference: reference.to_string(),
                },
            })
        }
    }

    fn entry(engine: &'static str, detector: impl TemplateEngineDetector + 'static) -> DetectedParser {
        DetectedParser {
            engine,
            detector: Box::new(detector),
            parser: Arc::new(Named(engine)),
        }
    }

    fn auto(parsers: Vec<DetectedParser>) -> AutoDetectTemplateParser {
        AutoDetectTemplateParser::new(Arc::new(StringResolver::new()), parsers)
    }

    #[test]
    fn test_first_accepting_detector_wins() {
        let parser = auto(vec![
            entry("never", Never),
            entry("first", FixedEngineDetector),
            entry("second", FixedEngineDetector),
        ]);
        let content = parser.parse("mail.txt", &TemplateContext::new()).unwrap();
        assert_eq!(content, Content::text("first"));
        assert_eq!(parser.engines(), vec!["never", "first", "second"]);
    }

    #[test]
    fn test_no_engine_available() {
        let parser = auto(vec![entry("never", Never)]);
        let err = parser.parse("mail.txt", &TemplateContext::new()).unwrap_err();
        match err {
            TemplateError::NoEngineAvailable { reference } => assert_eq!(reference, "mail.txt"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_detector_error_is_not_skipped() {
        let parser = auto(vec![entry("failing", Failing), entry("fallback", FixedEngineDetector)]);
        let err = parser.parse("mail.txt", &TemplateContext::new()).unwrap_err();
        assert!(matches!(err, TemplateError::EngineDetection { .. }));
    }
}
