// Survey generation: prompt in, typed fields out.
// All LLM calls go through llm_client; no direct API calls here.

pub mod generator;
pub mod handlers;
pub mod prompts;
