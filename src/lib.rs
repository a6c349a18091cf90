
pub mod service {
    pub mod config_service;
    pub mod file;
    pub mod image_codec;
    pub mod traits {
        pub mod i_service;
    }
}

pub mod config {
    pub mod config;
    pub mod ports;
}

pub mod action {
    pub mod cli;
    pub mod interactive;
}

pub mod facade {
    pub mod job_engine;
    pub mod ports {
        pub mod facade_ports;
    }
    pub mod traits {
        pub mod i_job;
    }
}

pub mod models {
    pub mod error;
    pub mod file;
    pub mod job;
}

pub mod utils {
    pub mod utils;
}

pub use facade::job_engine::{JobEngine, JobHandle, JobStart};
pub use facade::ports::facade_ports::ProgressSink;
pub use facade::traits::i_job::{JobEngineTrait, JobOutcome};
pub use models::error::JobError;
pub use models::job::{CancelToken, ConversionResult, JobConfig, JobSnapshot, JobSummary, WorkItem};
pub use service::traits::i_service::ImageCodecTrait;
