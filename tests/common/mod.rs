pub mod thread_group;
