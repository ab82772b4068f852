// Metrics collection and publishing
pub mod collect;

// LLM run summaries
pub mod summarize;
