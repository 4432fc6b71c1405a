//! File transfer flows: the /sendfile handshake, payload accumulation,
//! forwarding, persistence, and mid-transfer disconnects.

mod common;

use bytes::Bytes;
use common::TestServer;
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test]
async fn sendfile_persists_forwards_and_acknowledges() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect("alice").await.unwrap();
    let mut bob = server.connect("bob").await.unwrap();

    alice.send_line("/sendfile bob f.bin 10").await.unwrap();
    let ready = alice.recv_until_contains("ready").await.unwrap();
    assert!(ready.contains("'f.bin'"), "got: {ready}");
    bob.recv_until_contains("alice is sending you file 'f.bin'")
        .await
        .unwrap();

    alice.send_bytes(b"0123456789").await.unwrap();

    // Recipient: notice first, then the raw payload.
    bob.recv_until_contains("incoming file 'f.bin' from alice")
        .await
        .unwrap();
    let payload = bob.recv_bytes(10).await.unwrap();
    assert_eq!(payload, b"0123456789");

    // Sender: success acknowledgment, after which the file is persisted.
    alice.recv_until_contains("sent successfully").await.unwrap();
    assert_eq!(
        server.store.get("f.bin"),
        Some(Bytes::from_static(b"0123456789"))
    );
}

#[tokio::test]
async fn split_arrivals_accumulate_in_order() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect("alice").await.unwrap();
    let mut bob = server.connect("bob").await.unwrap();

    alice.send_line("/sendfile bob f.bin 10").await.unwrap();
    alice.recv_until_contains("ready").await.unwrap();

    // The canonical 3 + 7 split.
    alice.send_bytes(b"012").await.unwrap();
    sleep(Duration::from_millis(50)).await;
    alice.send_bytes(b"3456789").await.unwrap();

    bob.recv_until_contains("incoming file").await.unwrap();
    let payload = bob.recv_bytes(10).await.unwrap();
    assert_eq!(payload, b"0123456789");

    alice.recv_until_contains("sent successfully").await.unwrap();
    assert_eq!(
        server.store.get("f.bin"),
        Some(Bytes::from_static(b"0123456789"))
    );
}

#[tokio::test]
async fn stream_reverts_to_line_mode_after_payload() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect("alice").await.unwrap();
    let mut bob = server.connect("bob").await.unwrap();

    alice.send_line("/sendfile bob f.bin 4").await.unwrap();
    alice.recv_until_contains("ready").await.unwrap();

    // Payload and the next command arrive in a single write.
    alice.send_bytes(b"\x00\x01\x02\x03/who\n").await.unwrap();

    alice.recv_until_contains("sent successfully").await.unwrap();
    let who = alice.recv_until_contains("users online").await.unwrap();
    assert!(who.contains("users online (2)"), "got: {who}");

    bob.recv_until_contains("incoming file").await.unwrap();
    assert_eq!(bob.recv_bytes(4).await.unwrap(), b"\x00\x01\x02\x03");
}

#[tokio::test]
async fn payload_bytes_are_never_command_parsed() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect("alice").await.unwrap();
    let mut bob = server.connect("bob").await.unwrap();

    alice.send_line("/sendfile bob evil.txt 6").await.unwrap();
    alice.recv_until_contains("ready").await.unwrap();

    // Looks like a command, but it is file content.
    alice.send_bytes(b"/quit\n").await.unwrap();

    alice.recv_until_contains("sent successfully").await.unwrap();
    assert_eq!(
        server.store.get("evil.txt"),
        Some(Bytes::from_static(b"/quit\n"))
    );

    // The sender is still connected and chatting.
    alice.send_line("/who").await.unwrap();
    alice.recv_until_contains("users online (2)").await.unwrap();

    bob.recv_until_contains("incoming file").await.unwrap();
    assert_eq!(bob.recv_bytes(6).await.unwrap(), b"/quit\n");
}

#[tokio::test]
async fn sendfile_to_unknown_user_is_an_error() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect("alice").await.unwrap();

    alice.send_line("/sendfile ghost f.bin 4").await.unwrap();
    let reply = alice.recv_until_contains("error").await.unwrap();
    assert!(reply.contains("no such user: ghost"), "got: {reply}");
}

#[tokio::test]
async fn sendfile_to_self_is_an_error() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect("alice").await.unwrap();

    alice.send_line("/sendfile alice f.bin 4").await.unwrap();
    let reply = alice.recv_until_contains("error").await.unwrap();
    assert!(reply.contains("cannot target yourself"), "got: {reply}");
}

#[tokio::test]
async fn sendfile_size_is_validated() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect("alice").await.unwrap();
    let _bob = server.connect("bob").await.unwrap();

    for bad in ["/sendfile bob f.bin 0", "/sendfile bob f.bin -3", "/sendfile bob f.bin many"] {
        alice.send_line(bad).await.unwrap();
        let reply = alice.recv_until_contains("error").await.unwrap();
        assert!(reply.contains("invalid transfer size"), "got: {reply}");
    }

    alice.send_line("/sendfile bob f.bin").await.unwrap();
    let reply = alice.recv_until_contains("error").await.unwrap();
    assert!(reply.contains("usage: /sendfile"), "got: {reply}");
}

#[tokio::test]
async fn sendfile_over_the_size_limit_is_rejected() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect("alice").await.unwrap();
    let _bob = server.connect("bob").await.unwrap();

    alice
        .send_line("/sendfile bob huge.bin 999999999999")
        .await
        .unwrap();
    let reply = alice.recv_until_contains("error").await.unwrap();
    assert!(reply.contains("transfer size limit"), "got: {reply}");
}

#[tokio::test]
async fn busy_recipient_refuses_a_second_transfer() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect("alice").await.unwrap();
    let mut bob = server.connect("bob").await.unwrap();
    let mut carol = server.connect("carol").await.unwrap();

    alice.send_line("/sendfile bob f.bin 10").await.unwrap();
    alice.recv_until_contains("ready").await.unwrap();

    carol.send_line("/sendfile bob g.bin 5").await.unwrap();
    let reply = carol.recv_until_contains("error").await.unwrap();
    assert!(reply.contains("bob is busy"), "got: {reply}");

    // The first transfer is unaffected.
    alice.send_bytes(b"0123456789").await.unwrap();
    alice.recv_until_contains("sent successfully").await.unwrap();
    bob.recv_until_contains("incoming file 'f.bin'").await.unwrap();
    assert_eq!(bob.recv_bytes(10).await.unwrap(), b"0123456789");
}

#[tokio::test]
async fn receiving_user_cannot_start_an_upload() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect("alice").await.unwrap();
    let mut bob = server.connect("bob").await.unwrap();
    let _carol = server.connect("carol").await.unwrap();

    alice.send_line("/sendfile bob f.bin 10").await.unwrap();
    alice.recv_until_contains("ready").await.unwrap();
    bob.recv_until_contains("is sending you").await.unwrap();

    // Bob is mid-receive; his own /sendfile is refused.
    bob.send_line("/sendfile carol g.bin 5").await.unwrap();
    let reply = bob.recv_until_contains("error").await.unwrap();
    assert!(reply.contains("transfer in progress"), "got: {reply}");
}

#[tokio::test]
async fn sender_disconnect_mid_transfer_forwards_nothing() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect("alice").await.unwrap();
    let mut bob = server.connect("bob").await.unwrap();

    alice.send_line("/sendfile bob f.bin 10").await.unwrap();
    alice.recv_until_contains("ready").await.unwrap();
    bob.recv_until_contains("is sending you").await.unwrap();

    // Three of ten bytes, then gone.
    alice.send_bytes(b"012").await.unwrap();
    sleep(Duration::from_millis(50)).await;
    drop(alice);

    let notice = bob.recv_until_contains("aborted").await.unwrap();
    assert!(notice.contains("'f.bin'"), "got: {notice}");
    bob.recv_until_contains("alice has left the chat").await.unwrap();

    // No partial file anywhere, and the sender's name is free again.
    assert!(server.store.is_empty());
    let _alice2 = server.connect("alice").await.unwrap();

    // Bob is released and can receive a fresh transfer.
    let mut carol = server.connect("carol").await.unwrap();
    carol.send_line("/sendfile bob n.bin 2").await.unwrap();
    carol.recv_until_contains("ready").await.unwrap();
    carol.send_bytes(b"ok").await.unwrap();
    carol.recv_until_contains("sent successfully").await.unwrap();
}

#[tokio::test]
async fn recipient_disconnect_skips_forwarding_but_persists() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect("alice").await.unwrap();
    let bob = server.connect("bob").await.unwrap();

    alice.send_line("/sendfile bob f.bin 4").await.unwrap();
    alice.recv_until_contains("ready").await.unwrap();

    drop(bob);
    // Wait for the departure to propagate before completing the upload.
    alice.recv_until_contains("bob has left the chat").await.unwrap();

    alice.send_bytes(b"data").await.unwrap();
    alice.recv_until_contains("sent successfully").await.unwrap();

    assert_eq!(server.store.get("f.bin"), Some(Bytes::from_static(b"data")));
}
