mod persistence;

pub use persistence::{
    ConfigStore,
    PersistenceError,
    PersistenceResult,
};
