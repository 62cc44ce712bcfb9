//! empiredb-check
//!
//! Compares a statically declared [`Database`](empiredb::Database) model with
//! the schema of a live database.
//!
//! [`RemoteModelParser`] reads `information_schema` into a model of the same
//! shape; [`ModelChecker`] walks both and reports every difference (missing
//! objects, type, size, scale, nullability, primary keys, relations) to a
//! [`ModelErrorHandler`]. Handlers decide whether to log, collect or stop.
//!
//! # Example
//!
//! ```ignore
//! use empiredb_check::{ModelChecker, ModelErrorCollector, RemoteModelParser};
//!
//! let remote = RemoteModelParser::new("public").parse(&client).await?;
//! let mut issues = ModelErrorCollector::default();
//! ModelChecker::new().check(&model, &remote, &mut issues);
//! for issue in issues.issues() {
//!     println!("{issue}");
//! }
//! ```

pub mod checker;
pub mod error;
pub mod handler;
pub mod parser;

pub use checker::ModelChecker;
pub use error::{CheckError, CheckResult};
pub use handler::{FailFast, ModelErrorCollector, ModelErrorHandler, ModelErrorLogger, ModelIssue, ObjectKind};
pub use parser::{RemoteColumn, RemoteModelParser};
