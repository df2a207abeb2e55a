pub mod domain;
pub mod notification;
pub mod ports;
pub mod summarize;
pub mod workflow;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use domain::{
    Document, NewDocument, NewSummary, NewUser, Role, Summary, SummaryLength,
    SummaryStatus, User, UserCredentials,
};
pub use ports::{
    DatabaseService, EmailService, ExtractError, PortError, PortResult, TextExtractor,
};
pub use summarize::{
    ResultStatus, SummarizationChain, SummarizeError, Summarizer, SummaryMetrics, SummaryResult,
};
pub use workflow::{SummarizeOutcome, SummaryWorkflow};
