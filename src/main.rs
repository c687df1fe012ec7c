#[tokio::main]
async fn main() {
    carshare_backend::run().await;
}
