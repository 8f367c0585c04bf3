#[cfg(test)]
mod common;

mod aws_exchange_flow;
mod github_actions_flow;
