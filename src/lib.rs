//! Runtime service location keyed by type names.
//!
//! A [`Locator`] maps string type names to the implementations registered
//! for them. Implementations declare their parameters through a
//! [`Signature`]: either an explicit list of names, or the textual form of a
//! constructor such as `function Service(§logger, level) {}`, which is
//! scanned once at registration. Parameters starting with the dependency
//! sigil (`§` by default) are resolved recursively from the locator. Every
//! other parameter is looked up by name in the literal [`Parameters`] given
//! with the registration.
//!
//! By default, services are held in an `Arc<T>` and the locator can be shared
//! across threads. This can be changed by disabling default features and
//! enabling the "rc" feature:
//!
//! ```text
//! runtime_locator = {
//!     version = "*",
//!     default_features = false,
//!     features = ["rc"]
//! }
//! ```
//!
//! # Registrations
//!
//! Any number of implementations can be registered under the same type name.
//! The most recently registered one is used when the type name is resolved,
//! and [`Locator::resolve_all`] returns all of them, newest first. Each
//! registration has a [`Lifetime`]:
//!
//! - Transient: A service is created each time it is requested.
//! - Singleton: A service is created only the first time it is requested and
//!   that single instance is reused for each future request.
//!
//! Instances that have already been built can be registered directly with
//! [`Locator::register_instance`], and are always returned as-is.
//!
//! # Example
//!
//! ```
//! use runtime_locator::{
//!     Arguments, Component, Implementation, InjectResult, Lifetime, Locator,
//!     Parameters, Signature, Svc,
//! };
//!
//! struct User {
//!     name: String,
//! }
//!
//! // A repository backed by some connection string
//! struct UserRepository {
//!     connection: String,
//! }
//!
//! impl Component for UserRepository {
//!     fn signature() -> Signature {
//!         Signature::source("function UserRepository(connection) {}")
//!     }
//!
//!     fn construct(arguments: &Arguments) -> InjectResult<Self> {
//!         let connection = arguments
//!             .value::<String>(0)?
//!             .unwrap_or_else(|| "memory://".to_string());
//!         Ok(UserRepository { connection })
//!     }
//! }
//!
//! impl UserRepository {
//!     fn get_user(&self, id: u32) -> User {
//!         User {
//!             name: format!("user {id} from {}", self.connection),
//!         }
//!     }
//! }
//!
//! // A service that needs the repository, but doesn't build it itself
//! struct UserService {
//!     repository: Svc<UserRepository>,
//! }
//!
//! impl Component for UserService {
//!     fn signature() -> Signature {
//!         Signature::source("function UserService(§users) {}")
//!     }
//!
//!     fn construct(arguments: &Arguments) -> InjectResult<Self> {
//!         Ok(UserService {
//!             repository: arguments.service(0)?,
//!         })
//!     }
//! }
//!
//! let mut locator = Locator::new();
//! locator
//!     .register_with(
//!         "users",
//!         Implementation::class::<UserRepository>(),
//!         Parameters::new().with("connection", "sql://db".to_string()),
//!         Lifetime::Singleton,
//!     )
//!     .unwrap();
//! locator
//!     .register("user_service", Implementation::class::<UserService>())
//!     .unwrap();
//!
//! let service: Svc<UserService> = locator.get("user_service").unwrap();
//! let user = service.repository.get_user(3);
//! assert_eq!("user 3 from sql://db", user.name);
//! ```

#![forbid(unsafe_code)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::needless_pass_by_value
)]

#[cfg(not(any(feature = "arc", feature = "rc")))]
compile_error!(
    "Either the 'arc' or 'rc' feature must be enabled (but not both)."
);

#[cfg(all(feature = "arc", feature = "rc"))]
compile_error!(
    "The 'arc' and 'rc' features are mutually exclusive and cannot be enabled together."
);

mod locator;
mod module;
mod registry;
mod requests;
mod services;
mod signature;

pub use locator::*;
pub use module::*;
pub use registry::*;
pub use requests::*;
pub use services::*;
pub use signature::*;

#[cfg(test)]
mod tests;
