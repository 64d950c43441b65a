mod alignment;
mod concurrency;
mod dispatch;
mod trajectory_lifecycle;
