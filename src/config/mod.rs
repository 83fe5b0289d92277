//! TOML configuration: language, repository backend and pattern rules.
//!
//! ```toml
//! [engine]
//! language = "java"
//! user = "ana"
//!
//! [repository]
//! kind = "local"
//! root = "src"
//!
//! [[rules]]
//! id = "null-unsafe-equals"
//! description = "equals called on a possibly null receiver"
//! pattern = "$L.equals($R)"
//! rewrite = "java.util.Objects.equals($L, $R)"
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_from_path, load_from_str, ConfigError, Origin};
pub use schema::{
    EngineConfig, EngineSection, RepositoryKind, RepositorySection, RuleDefinition,
    ValidationError, ValidationIssue,
};

use crate::engine::{Engine, EngineError};
use crate::repository::{InMemoryRepository, LocalRepository};
use crate::tree::TreeSitterParser;

impl EngineConfig {
    /// Wire an engine. Rules that fail to compile become wiring errors on the
    /// engine instead of failing the build.
    pub fn build(&self) -> Result<Engine, EngineError> {
        let mut builder = Engine::builder()
            .user(self.engine.user.clone())
            .parser(TreeSitterParser::new(self.lang())?);

        builder = match self.repository.kind {
            RepositoryKind::Memory => builder.repository(InMemoryRepository::new(self.engine.user.clone())),
            RepositoryKind::Local => builder.repository(LocalRepository::open(
                self.repository_root(),
                self.engine.user.clone(),
            )?),
        };

        for rule in self.rules() {
            builder = builder.rule(rule);
        }
        builder.build()
    }
}
