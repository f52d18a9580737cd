//! Persistent worker protocol over an in-memory pipe.

use std::sync::Arc;
use std::time::Duration;

use ktbuild_proto::{read_delimited, write_delimited, WorkRequest, WorkResponse};
use ktbuild_worker::{Granularity, PersistentWorker, TaskContext, Work, WorkError, WorkerContext};
use tokio::io::AsyncWriteExt;

fn echo_work() -> Arc<dyn Work> {
    Arc::new(|ctx: &mut TaskContext, args: &[String]| -> Result<(), WorkError> {
        if let Some(ms) = args.first().and_then(|a| a.strip_prefix("sleep=")) {
            let ms: u64 = ms.parse().map_err(|_| WorkError::Argument(ms.to_string()))?;
            std::thread::sleep(Duration::from_millis(ms));
        }
        if args.iter().any(|a| a == "panic") {
            panic!("worker task exploded");
        }
        std::fs::write(ctx.directory().join("scratch"), args.join(" "))?;
        ctx.log().info(format!("echo {}", args.join(" ")));
        Ok(())
    })
}

fn request(id: i32, args: &[&str]) -> WorkRequest {
    WorkRequest {
        arguments: args.iter().map(|a| a.to_string()).collect(),
        request_id: id,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_multiplexed_requests_are_correlated() {
    let root = tempfile::tempdir().unwrap();
    let (client, server) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server);
    let (mut client_read, mut client_write) = tokio::io::split(client);

    let worker = PersistentWorker::new(
        WorkerContext::new("test", Granularity::Info),
        echo_work(),
        root.path().to_path_buf(),
    );
    let server_task = tokio::spawn(async move { worker.run(server_read, server_write).await });

    write_delimited(&mut client_write, &request(1, &["sleep=200", "slow"])).await.unwrap();
    write_delimited(&mut client_write, &request(2, &["fast"])).await.unwrap();
    write_delimited(&mut client_write, &request(3, &["panic"])).await.unwrap();

    let mut responses = Vec::new();
    for _ in 0..3 {
        let response: WorkResponse = read_delimited(&mut client_read).await.unwrap().unwrap();
        responses.push(response);
    }

    // The slow request finishes last.
    assert_eq!(responses.last().unwrap().request_id, 1);

    responses.sort_by_key(|r| r.request_id);
    assert_eq!(responses[0].exit_code, 0);
    assert!(responses[0].output.contains("echo sleep=200 slow"));
    assert_eq!(responses[1].exit_code, 0);
    assert!(responses[1].output.contains("echo fast"));
    assert_eq!(responses[2].exit_code, 1);
    assert!(responses[2].output.contains("worker task exploded"));

    client_write.shutdown().await.unwrap();
    drop(client_write);
    server_task.await.unwrap().unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(root.path()).unwrap().collect();
    assert!(leftovers.is_empty(), "sandbox directories left behind");
}

#[tokio::test]
async fn test_end_of_input_stops_worker() {
    let root = tempfile::tempdir().unwrap();
    let worker = PersistentWorker::new(
        WorkerContext::new("test", Granularity::Info),
        echo_work(),
        root.path().to_path_buf(),
    );

    let mut output = Vec::new();
    worker.run(tokio::io::empty(), &mut output).await.unwrap();
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_response_write_failure_stops_worker() {
    let root = tempfile::tempdir().unwrap();
    let worker = PersistentWorker::new(
        WorkerContext::new("test", Granularity::Info),
        echo_work(),
        root.path().to_path_buf(),
    );

    // Input stays open for the whole test; output has no reader.
    let (mut input, server_read) = tokio::io::duplex(1024);
    let (output, server_write) = tokio::io::duplex(1024);
    drop(output);

    write_delimited(&mut input, &request(1, &["fast"])).await.unwrap();

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        worker.run(server_read, server_write),
    )
    .await
    .expect("worker kept running after its output closed");

    assert!(matches!(result, Err(ktbuild_worker::WorkerError::Protocol(_))));
    drop(input);
}
