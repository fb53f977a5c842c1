//! Sliced upload example for large files
//!
//! This example demonstrates:
//! - Uploading a large file as a multipart slice session
//! - Tracking upload progress
//!
//! Run with: cargo run --example slice_upload

use cos_client::{Config, CosClient, Credentials, UploadProgress};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("📦 COS Client - Sliced Upload Example\n");

    let credentials = Credentials::new(
        "sh",
        "your-app-id",
        "your-secret-id",
        "your-secret-key",
    )?;
    let client = CosClient::new(credentials, Config::default())?;

    // Anything at or above the 20 MiB threshold is sliced automatically;
    // each 1 MiB slice is retried independently on transient failures.
    println!("📤 Uploading './big-data.bin'...");
    let progress = Box::new(|p: UploadProgress| {
        println!(
            "   Progress: {:.1}% ({}/{} slices, {} bytes)",
            p.percentage(),
            p.current_slice + 1,
            p.total_slices,
            p.bytes_sent,
        );
    });

    let data = client
        .upload_object_with_progress(
            "testbucket",
            "./big-data.bin",
            "big-data.bin",
            "",
            true,
            Some(progress),
        )
        .await?;

    println!("\n✅ Upload complete");
    println!("   access url:    {}", data.access_url);
    println!("   resource path: {}", data.resource_path);
    println!("   source url:    {}", data.source_url);

    Ok(())
}
