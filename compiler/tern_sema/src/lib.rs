//! Semantic front end for Tern.
//!
//! Takes a pre-lexed token stream and produces a typed [`ProgramNode`] tree
//! ready for C emission. One forward pass (the [`Sequencer`]) resolves
//! names against the [`SymbolTable`], picks overloads with the staged
//! resolver in [`overload`], and materializes generic templates through
//! [`generics::instantiate`] as they are referenced.
//!
//! All mutable state lives in a [`Session`]:
//!
//! ```text
//! let mut session = Session::new();
//! let program = tern_sema::sequence_program(&mut session, &tokens)?;
//! let c_text = program.to_c();
//! ```
//!
//! [`ProgramNode`]: tern_ir::ProgramNode

mod config;
mod error;
pub mod generics;
pub mod overload;
mod prelude;
mod registry;
mod sequencer;
mod session;
mod symbols;

use std::sync::Once;

use tern_ir::Token;

pub use config::SessionConfig;
pub use error::{ResultExt, SemaError, SemaErrorKind, SemaResult};
pub use generics::{GenericInfo, GenericKind, GenericRegistry, SequenceService};
pub use prelude::{BinaryOp, Builtin, PRELUDE_FILE};
pub use registry::{EnumLookupData, StructLookupData, TypeRegistry};
pub use sequencer::{Program, Sequencer};
pub use session::{Callee, ResolvedCall, Session};
pub use symbols::{Defined, MultiTableSymbol, Redefinition, SymbolKind, SymbolTable, AUTOGEN_SENTINEL};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=tern_sema=debug` or
/// `RUST_LOG=tern_sema=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Sequence one compilation unit.
pub fn sequence_program(session: &mut Session, tokens: &[Token]) -> SemaResult<Program> {
    Sequencer::new(session).sequence_program(tokens)
}
