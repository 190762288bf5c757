//! # Extension Points
//!
//! Ways the shell grows beyond its built-in commands.
//!
//! ## Command loading
//!
//! `register` resolves a locator string through [`CommandResolver`]:
//!
//! | Locator | Meaning |
//! |---------|---------|
//! | `builtin:<id>` | factory compiled into the shell |
//! | `/path/to/exe` or `file://...` | external executable |
//!
//! External executables declare themselves by answering `--manifest`
//! with JSON (`name`, `aliases`, `hidden`, `header`, `usage`), or are
//! described declaratively at registration and checked lazily.
//!
//! ## Collaborator ports
//!
//! - [`ExpressionEvaluator`] - last-chance handler for unresolved lines
//! - [`ExampleParser`] / [`LangPackGenerator`] - the simple generator's
//!   parsing and code generation seams

mod evaluator;
mod external;
mod langpack;
mod locator;
mod manifest;

pub use evaluator::{EvalError, ExpressionEvaluator, NullEvaluator};
pub use external::{ExternalCommand, MANIFEST_FLAG};
pub use langpack::{
    guess_content_kind, ContentKind, EmptyPropertyPolicy, ExampleParseError, ExampleParser,
    LangPackError, LangPackGenerator, Platform, RestExampleModel,
};
pub use locator::{CommandFactory, CommandResolver, Locator, LocatorError};
pub use manifest::CommandManifest;
