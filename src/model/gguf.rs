use std::fs::File;
use std::path::Path;

use candle_core::quantized::gguf_file;
use candle_core::{Device, Tensor};
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::quantized_llama::ModelWeights;
use rayon::ThreadPool;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use super::{Completion, CompletionModel, CompletionRequest, FinishReason, ModelParams};
use crate::error::{CategorizerError, Result};
use crate::logging::{CATEGORIZE, MODEL_LOAD};

const EOS_METADATA_KEY: &str = "tokenizer.ggml.eos_token_id";

/// Quantized llama-family weights from a single GGUF file, run on the CPU.
pub struct GgufModel {
    generator: Generator,
    pool: ThreadPool,
}

struct Generator {
    weights: ModelWeights,
    tokenizer: Tokenizer,
    device: Device,
    params: ModelParams,
    eos_token_id: Option<u32>,
    seed: u64,
}

impl GgufModel {
    pub fn load(
        model_path: &Path,
        tokenizer_path: &Path,
        params: ModelParams,
        seed: u64,
    ) -> Result<Self> {
        if params.n_gpu_layers > 0 {
            warn!(
                target: MODEL_LOAD,
                n_gpu_layers = params.n_gpu_layers,
                "GPU offload requested but not supported, running on CPU"
            );
        }
        let device = Device::Cpu;

        let mut file = File::open(model_path).map_err(|e| load_error(model_path, e))?;
        let content =
            gguf_file::Content::read(&mut file).map_err(|e| load_error(model_path, e))?;
        let metadata_eos = content
            .metadata
            .get(EOS_METADATA_KEY)
            .and_then(|value| value.to_u32().ok());
        debug!(
            target: MODEL_LOAD,
            tensors = content.tensor_infos.len(),
            metadata_entries = content.metadata.len(),
            "Read GGUF header"
        );

        let weights = ModelWeights::from_gguf(content, &mut file, &device)
            .map_err(|e| load_error(model_path, e))?;

        let tokenizer = Tokenizer::from_file(tokenizer_path).map_err(|e| {
            CategorizerError::ModelLoad(format!(
                "failed to load tokenizer {}: {}",
                tokenizer_path.display(),
                e
            ))
        })?;
        let eos_token_id = metadata_eos.or_else(|| tokenizer.token_to_id("</s>"));

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.n_threads)
            .build()
            .map_err(|e| load_error(model_path, e))?;

        info!(
            target: MODEL_LOAD,
            n_ctx = params.n_ctx,
            n_threads = params.n_threads,
            eos_token_id = ?eos_token_id,
            "Model loaded"
        );

        Ok(GgufModel {
            generator: Generator {
                weights,
                tokenizer,
                device,
                params,
                eos_token_id,
                seed,
            },
            pool,
        })
    }
}

impl CompletionModel for GgufModel {
    fn complete(&mut self, request: &CompletionRequest) -> Result<Completion> {
        let GgufModel { generator, pool } = self;
        pool.install(|| generator.generate(request))
    }
}

impl Generator {
    fn generate(&mut self, request: &CompletionRequest) -> Result<Completion> {
        let encoding = self
            .tokenizer
            .encode(request.prompt.as_str(), true)
            .map_err(|e| CategorizerError::Inference(format!("tokenization failed: {e}")))?;
        let prompt_tokens = encoding.get_ids();
        let prompt_len = prompt_tokens.len();

        if prompt_len >= self.params.n_ctx {
            return Err(CategorizerError::Inference(format!(
                "Requested tokens ({}) exceed context window of {}",
                prompt_len, self.params.n_ctx
            )));
        }
        let budget = request.max_tokens.min(self.params.n_ctx - prompt_len);

        let temperature = (request.temperature > 0.0).then_some(request.temperature);
        let mut sampler = LogitsProcessor::new(self.seed, temperature, None);

        let input = Tensor::new(prompt_tokens, &self.device)?.unsqueeze(0)?;
        let logits = self.weights.forward(&input, 0)?.squeeze(0)?;
        let mut next_token = sampler.sample(&logits)?;

        let mut generated: Vec<u32> = Vec::with_capacity(budget);
        let mut text = String::new();
        let mut finish_reason = FinishReason::Length;

        for index in 0..budget {
            if Some(next_token) == self.eos_token_id {
                finish_reason = FinishReason::Stop;
                break;
            }
            generated.push(next_token);
            text = self
                .tokenizer
                .decode(&generated, true)
                .map_err(|e| CategorizerError::Inference(format!("decoding failed: {e}")))?;

            if let Some(cut) = find_stop(&text, &request.stop) {
                text.truncate(cut);
                finish_reason = FinishReason::Stop;
                break;
            }
            if index + 1 == budget {
                break;
            }

            let input = Tensor::new(&[next_token], &self.device)?.unsqueeze(0)?;
            let logits = self
                .weights
                .forward(&input, prompt_len + index)?
                .squeeze(0)?;
            next_token = sampler.sample(&logits)?;
        }

        debug!(
            target: CATEGORIZE,
            prompt_tokens = prompt_len,
            generated_tokens = generated.len(),
            finish_reason = ?finish_reason,
            "Generation complete"
        );

        if request.echo {
            text.insert_str(0, &request.prompt);
        }
        Ok(Completion::single(text, finish_reason))
    }
}

fn load_error(model_path: &Path, e: impl std::fmt::Display) -> CategorizerError {
    CategorizerError::ModelLoad(format!("{}: {}", model_path.display(), e))
}

/// Byte offset of the earliest stop sequence in `text`.
fn find_stop(text: &str, stop: &[String]) -> Option<usize> {
    stop.iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| text.find(s.as_str()))
        .min()
}
