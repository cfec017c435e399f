mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use lintel::{BasicAuthenticator, Error, Exchange, InvalidArgument, Protocol, Response, Server};

use common::{body, dispatch, get, handler_x, handler_y, recording, server, Trail};

#[tokio::test]
async fn registers_and_describes_a_route() {
    let server = server();
    let ctx = server.create_context("http", "/api", handler_x).unwrap();

    assert_eq!(ctx.protocol(), Protocol::Http);
    assert_eq!(ctx.path(), "/api");
    assert!(ctx.is_bound());
    assert!(Arc::ptr_eq(&ctx.server().unwrap(), &server));
    assert_eq!(body(&dispatch(&ctx, get("/api")).await), "x");

    let trail = Trail::default();
    ctx.user_filters().push(recording("Logging", &trail));
    assert_eq!(ctx.user_filters().descriptions(), ["Logging"]);

    let chain_len = ctx.chain().unwrap().len();
    let auth = BasicAuthenticator::new("api", |_, _| true).unwrap();
    assert!(ctx.set_authenticator(Some(Arc::new(auth))).is_none());
    assert_eq!(ctx.chain().unwrap().len(), chain_len);
}

#[test]
fn protocol_is_normalized_and_path_preserved() {
    let server = server();
    for (protocol, path, expected) in [
        ("HTTP", "/", Protocol::Http),
        ("Https", "/a/b/", Protocol::Https),
        ("hTTp", "/with space/%20", Protocol::Http),
    ] {
        let ctx = server.create_unbound_context(protocol, path).unwrap();
        assert_eq!(ctx.protocol(), expected);
        assert_eq!(ctx.protocol().to_string(), protocol.to_ascii_lowercase());
        assert_eq!(ctx.path(), path);
    }
}

#[test]
fn malformed_routes_are_rejected_without_registering() {
    let server = server();

    let cases = [
        ("http", "", InvalidArgument::EmptyPath),
        ("http", "api", InvalidArgument::RelativePath("api".to_owned())),
        ("ftp", "/", InvalidArgument::Protocol("ftp".to_owned())),
        ("", "/", InvalidArgument::Protocol(String::new())),
    ];
    for (protocol, path, expected) in cases {
        match server.create_context(protocol, path, handler_x) {
            Err(Error::InvalidArgument(got)) => assert_eq!(got, expected),
            other => panic!("expected {expected:?}, got {other:?}"),
        }
    }
    assert!(server.contexts().is_empty());
}

#[tokio::test]
async fn binding_twice_keeps_the_first_handler() {
    let server = server();

    let eager = server.create_context("http", "/eager", handler_x).unwrap();
    assert!(matches!(eager.set_handler(handler_y), Err(Error::AlreadyBound { .. })));
    assert_eq!(body(&dispatch(&eager, get("/eager")).await), "x");

    let deferred = server.create_unbound_context("http", "/deferred").unwrap();
    assert!(deferred.handler().is_none());
    deferred.set_handler(handler_y).unwrap();
    let first = deferred.handler().unwrap();

    match deferred.set_handler(handler_x) {
        Err(Error::AlreadyBound { protocol, path }) => {
            assert_eq!(protocol, Protocol::Http);
            assert_eq!(path, "/deferred");
        }
        other => panic!("expected AlreadyBound, got {other:?}"),
    }
    assert!(Arc::ptr_eq(&first, &deferred.handler().unwrap()));
    assert_eq!(body(&dispatch(&deferred, get("/deferred")).await), "y");
}

#[test]
fn concurrent_binds_have_one_winner() {
    let server = server();
    let ctx = server.create_unbound_context("https", "/race").unwrap();
    let wins = Arc::new(AtomicUsize::new(0));

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let ctx = Arc::clone(&ctx);
            let wins = Arc::clone(&wins);
            thread::spawn(move || {
                if ctx.set_handler(|_: Exchange| async { Response::text("won") }).is_ok() {
                    wins.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    assert_eq!(wins.load(Ordering::SeqCst), 1);
    assert!(ctx.is_bound());
}

#[test]
fn duplicate_routes_are_rejected_per_protocol() {
    let server = server();
    server.create_context("http", "/dup", handler_x).unwrap();

    let err = server.create_unbound_context("HTTP", "/dup").unwrap_err();
    assert!(matches!(err, Error::DuplicateContext { protocol: Protocol::Http, .. }));
    assert_eq!(err.to_string(), "http context `/dup` is already registered");

    server.create_context("https", "/dup", handler_y).unwrap();
    assert_eq!(server.contexts().len(), 2);
}

#[test]
fn removed_context_outlives_the_registry_entry() {
    let server = server();
    let ctx = server.create_context("http", "/gone", handler_x).unwrap();

    let removed = server.remove_context(Protocol::Http, "/gone").unwrap();
    assert!(Arc::ptr_eq(&ctx, &removed));
    assert!(server.context(Protocol::Http, "/gone").is_none());
    assert!(server.remove_context(Protocol::Http, "/gone").is_none());
    assert!(ctx.chain().is_some());
}

#[test]
fn context_lookup_is_exact() {
    let server = server();
    server.create_context("http", "/api", handler_x).unwrap();

    assert!(server.context(Protocol::Http, "/api").is_some());
    assert!(server.context(Protocol::Http, "/api/users").is_none());
    assert!(server.context(Protocol::Https, "/api").is_none());
}

#[test]
fn server_back_reference_does_not_keep_it_alive() {
    let server = Server::bind("127.0.0.1:9000").unwrap();
    let ctx = server.create_context("http", "/", handler_x).unwrap();
    assert_eq!(ctx.server().unwrap().address().port(), 9000);

    drop(server);
    assert!(ctx.server().is_none());
}

#[test]
fn bad_address_is_an_invalid_argument() {
    assert!(matches!(
        Server::bind("not an address"),
        Err(Error::InvalidArgument(InvalidArgument::Address(_)))
    ));
}
