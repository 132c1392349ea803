mod properties;
mod settings;

pub use properties::Properties;
pub use settings::{
    CssSettings, ImageSettings, MessagingSettings, ResourceSettings, Settings, TemplateSettings,
};
