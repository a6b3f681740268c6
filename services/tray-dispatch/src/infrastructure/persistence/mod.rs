//! 进程内持久化

mod in_memory;

pub use in_memory::InMemoryDispatchRepository;
