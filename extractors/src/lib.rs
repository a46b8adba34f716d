pub mod aggregator;
pub mod amount;
pub mod budget;
pub mod classifier;
pub mod html;
pub mod normalizer;
pub mod pipeline;
pub mod refund;
pub mod rules;

pub use aggregator::aggregate;
pub use amount::{AmountExtractor, Extraction};
pub use budget::evaluate;
pub use classifier::SourceClassifier;
pub use pipeline::{MessagePipeline, PipelineStats, SkipReason};
pub use refund::RefundDetector;
