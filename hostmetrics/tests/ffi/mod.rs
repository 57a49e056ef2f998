mod concurrent_access;
mod cpu_sampling;
mod host_metrics;
mod marshal_contract;
