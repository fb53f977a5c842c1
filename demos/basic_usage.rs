//! Basic usage example for the COS object-storage client
//!
//! This example demonstrates:
//! - Uploading an object
//! - Creating and listing a directory
//! - Statting and deleting objects
//!
//! Run with: cargo run --example basic_usage

use cos_client::{Config, CosClient, Credentials, ListOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("🚀 COS Client - Basic Usage Example\n");

    // Region mapping: south -> gz, central -> sh, north -> tj
    let credentials = Credentials::new(
        "sh",
        "your-app-id",
        "your-secret-id",
        "your-secret-key",
    )?;
    let client = CosClient::new(credentials, Config::default())?;

    // ==================== Object Operations ====================

    println!("📤 Uploading './hello.txt'...");
    match client
        .upload_object("testbucket", "./hello.txt", "hello.txt", "", false)
        .await
    {
        Ok(data) => println!("   ✅ Uploaded, available at {}", data.access_url),
        Err(e) => println!("   ⚠️  {e}"),
    }

    println!("\n🔍 Statting 'hello.txt'...");
    match client.stat_object("testbucket", "hello.txt").await {
        Ok(stat) => println!("   ✅ size: {:?}, sha: {:?}", stat.filesize, stat.sha),
        Err(e) => println!("   ⚠️  {e}"),
    }

    // ==================== Directory Operations ====================

    println!("\n📁 Creating directory 'testdir'...");
    match client.create_directory("testbucket", "testdir", "").await {
        Ok(created) => println!("   ✅ Created at {}", created.resource_path),
        Err(e) => println!("   ⚠️  {e}"),
    }

    client
        .upload_object("testbucket", "./hello.txt", "testdir/hello.txt", "", false)
        .await?;

    println!("\n📋 Listing 'testdir'...");
    let listing = client
        .list_directory("testbucket", "testdir", ListOptions::default())
        .await?;
    for entry in &listing.infos {
        let kind = if entry.is_directory() { "dir " } else { "file" };
        println!("   {kind} {}", entry.name);
    }

    // ==================== Cleanup ====================

    println!("\n🗑  Cleaning up...");
    client.delete_object("testbucket", "testdir/hello.txt").await?;
    client.remove_directory("testbucket", "testdir").await?;
    client.delete_object("testbucket", "hello.txt").await?;
    println!("   ✅ Done");

    Ok(())
}
