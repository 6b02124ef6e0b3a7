use code_exec_client::{ClientConfig, CodeInterpreterClient, DEFAULT_API_URL};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config = ClientConfig::new(std::env::var("CODE_EXEC_API_KEY")?).with_api_url(
        std::env::var("CODE_EXEC_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
    );
    let client = CodeInterpreterClient::new(config)?;

    println!("Python:\n{}\n", client.run_python("print('Hello from Python!')\nprint(2 + 2)").await);
    println!(
        "Node.js:\n{}\n",
        client
            .run_javascript("console.log('Hello from Node.js!');\nconsole.log(3 * 3);")
            .await
    );

    let response = client
        .execute("python", "import json\nprint(json.dumps({'sum': sum(range(10))}))")
        .await?;
    println!("Status: {}", response.status);
    println!("Output: {}", response.stdout);

    Ok(())
}
