use underwrite_risk_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        if err.is_client_error() {
            println!("{}", err.payload());
        } else {
            eprintln!("application error: {err}");
        }
        std::process::exit(1);
    }
}
