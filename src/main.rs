use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    jh_lib::run().await
}
