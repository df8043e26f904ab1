//! Factory for creating pipelines from configuration.

use std::sync::Arc;

use memoria_core::{Corrector, LlmCorrector, MemoriaConfig, MemoriaResult};
use memoria_extractors::AcquirerFactory;
use memoria_llm::GeneratorFactory;
use tracing::info;

use crate::orchestrator::Pipeline;
use crate::storage::FsOutputStore;

/// Create the corrector from the `[corrector]` section, or the default provider.
pub fn create_corrector(config: &MemoriaConfig) -> MemoriaResult<Arc<dyn Corrector>> {
    let provider = config.corrector.clone().unwrap_or_default();
    let generator = GeneratorFactory::from_config(&provider)?;
    info!(
        provider = ?provider.provider,
        model = generator.model_name(),
        "corrector enabled"
    );
    Ok(Arc::new(LlmCorrector::new(generator)))
}

/// Create a pipeline writing to the configured output root.
///
/// The corrector is only attached when `correct` is set; a corrector that
/// cannot be created is a configuration error in that case.
pub fn create_pipeline(config: &MemoriaConfig, correct: bool) -> MemoriaResult<Pipeline> {
    config.validate()?;

    let acquirer = AcquirerFactory::from_config(&config.acquisition);
    let store = Arc::new(FsOutputStore::new(&config.output.root));
    let pipeline = Pipeline::new(config, acquirer, store)?;

    if correct {
        Ok(pipeline.with_corrector(create_corrector(config)?))
    } else {
        Ok(pipeline)
    }
}
