// Batch analysis: validates the submission, fans one model call out per job
// role, joins all-or-nothing, tags and persists the results.
// All LLM calls go through llm_client — no direct Gemini calls here.

pub mod handlers;
pub mod orchestrator;
