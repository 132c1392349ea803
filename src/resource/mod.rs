//! Resource resolution.
//!
//! Templates, stylesheets and images are referenced by strings that may carry a
//! lookup prefix selecting the resolver in charge:
//!
//! | Reference | Resolver |
//! |-----------|----------|
//! | `classpath:/templates/welcome.html` | [`ClassPathResolver`] |
//! | `file:/var/mail/welcome.html` | [`FileResolver`] |
//! | `string:Hello {{name}}` | [`StringResolver`] |
//! | `welcome.html` | the configured default resolver |
//!
//! [`LookupMappingResolver`] is the chain: an explicit prefix only ever reaches
//! the resolver registered for it, anything else goes to the default resolver.
//! Registrations are kept in insertion order.

mod builder;
mod classpath;
mod file;
mod lookup;
mod reference;
mod resolver;
mod string;

pub use builder::ResourceResolverBuilder;
pub use classpath::ClassPathResolver;
pub use file::FileResolver;
pub use lookup::{LookupMappingResolver, RelativeResolver};
pub use reference::ResourceReference;
pub use resolver::{actual_resolver, ResolverKind, Resource, ResourceError, ResourceResolver};
pub use string::StringResolver;
