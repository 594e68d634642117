//! Core library for static-asset build orchestration.

pub mod cleaner;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod path_utils;
pub mod registry;
pub mod runner;
pub mod serve;
pub mod server;
pub mod stage;
pub mod task;
pub mod watcher;

pub use config::{resolve, AssetPaths, BuildConfig, Config, ServerConfig, StageCommands};
pub use context::BuildContext;
pub use error::{Error, Result};
pub use executor::{Pipeline, PipelineReport};
pub use registry::TaskRegistry;
pub use runner::{parallel, series, Parallel, Series};
pub use server::{DevServer, NoReload, ReloadScope, Reloader, ServerOptions};
pub use stage::{FileRecord, StageContext, StageFactory, StageKind, Transform};
pub use task::{invoke, CleanTask, PipelineTask, Task, TaskRef};
pub use watcher::{ChangeEvent, FileWatcher, InFlightGate, WatchAction, WatchBinding};
