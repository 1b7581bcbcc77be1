#[tokio::main]
async fn main() -> anyhow::Result<()> {
    arena::start_server().await
}
