//! Benchmarks for tokenizing, serializing and dispatching messages.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use slirc_client::message::tags::format_tags;
use slirc_client::{is_match, CtcpMessage, MessageRegistry, RawMessage};

/// Simple PING message
const SIMPLE_MESSAGE: &str = "PING :irc.example.com";

/// Message with prefix
const PREFIX_MESSAGE: &str = ":nick!user@host PRIVMSG #channel :Hello, world!";

/// Message with IRCv3 tags
const TAGGED_MESSAGE: &str = "@time=2023-01-01T00:00:00.000Z;msgid=abc123;+example/tag=value :nick!user@host PRIVMSG #channel :Hello with tags!";

/// Complex message with escaped tags
const COMPLEX_TAGS: &str = "@time=2023-01-01T12:00:00Z;msgid=msg-12345;+draft/reply=parent-id;batch=batch001;account=user\\sname :nick!user@host.example.com PRIVMSG #long-channel-name :This is a longer message with more content to parse";

/// Numeric response
const NUMERIC_RESPONSE: &str = ":irc.server.net 001 nickname :Welcome to the IRC Network nickname!user@host";

/// CTCP query
const CTCP_MESSAGE: &str = ":bob!b@host PRIVMSG alice :\x01PING 1700000000\x01";

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Parsing");

    let cases = [
        ("simple_ping", SIMPLE_MESSAGE),
        ("with_prefix", PREFIX_MESSAGE),
        ("with_tags", TAGGED_MESSAGE),
        ("complex_tags", COMPLEX_TAGS),
        ("numeric_response", NUMERIC_RESPONSE),
    ];
    for (name, line) in cases {
        group.bench_function(name, |b| {
            b.iter(|| {
                let msg = RawMessage::parse(black_box(line)).unwrap();
                black_box(msg)
            })
        });
    }

    group.bench_function("tag_lookup", |b| {
        let msg = RawMessage::parse(COMPLEX_TAGS).unwrap();
        b.iter(|| black_box(msg.tag_value(black_box("account"))))
    });

    group.finish();
}

fn benchmark_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Serialization");

    let simple = RawMessage::parse(SIMPLE_MESSAGE).unwrap();
    let with_prefix = RawMessage::parse(PREFIX_MESSAGE).unwrap();
    let with_tags = RawMessage::parse(TAGGED_MESSAGE).unwrap();
    let complex = RawMessage::parse(COMPLEX_TAGS).unwrap();

    for (name, msg) in [
        ("simple_ping", &simple),
        ("with_prefix", &with_prefix),
        ("with_tags", &with_tags),
        ("complex_tags", &complex),
    ] {
        group.bench_function(BenchmarkId::new("validated", name), |b| {
            b.iter(|| black_box(black_box(msg).serialize().unwrap()))
        });
        group.bench_function(BenchmarkId::new("unchecked", name), |b| {
            b.iter(|| black_box(black_box(msg).to_wire_string()))
        });
    }

    group.finish();
}

fn benchmark_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Construction");

    group.bench_function("privmsg_simple", |b| {
        b.iter(|| {
            let msg = RawMessage::new("PRIVMSG", [black_box("#channel"), black_box("Hello, world!")]);
            black_box(msg)
        })
    });

    group.bench_function("privmsg_full", |b| {
        b.iter(|| {
            let tag = format_tags([
                ("time", Some("2023-01-01T12:00:00Z")),
                ("msgid", Some("abc123")),
            ]);
            let msg = RawMessage::new("PRIVMSG", [black_box("#channel"), black_box("Hello!")])
                .with_tag(tag)
                .with_prefix("nick!user@host");
            black_box(msg)
        })
    });

    group.bench_function("ctcp_query", |b| {
        let ctcp = CtcpMessage::new("PING", "1700000000");
        b.iter(|| black_box(ctcp.to_query([black_box("alice")]).unwrap()))
    });

    group.finish();
}

fn benchmark_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Typed Dispatch");
    let registry = MessageRegistry::global();

    for (name, line) in [
        ("privmsg", PREFIX_MESSAGE),
        ("welcome", NUMERIC_RESPONSE),
        ("unregistered", ":srv MODE #channel +o nick"),
    ] {
        let raw = RawMessage::parse(line).unwrap();
        group.bench_with_input(BenchmarkId::new("create_instance", name), &raw, |b, raw| {
            b.iter(|| black_box(registry.create_instance(raw.clone()).unwrap()))
        });
    }

    group.bench_function("ctcp_extract", |b| {
        let raw = RawMessage::parse(CTCP_MESSAGE).unwrap();
        b.iter(|| black_box(CtcpMessage::try_extract(black_box(&raw))))
    });

    group.finish();
}

fn benchmark_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("Round Trip");

    let messages = vec![
        ("simple", SIMPLE_MESSAGE),
        ("prefix", PREFIX_MESSAGE),
        ("tagged", TAGGED_MESSAGE),
        ("complex", COMPLEX_TAGS),
    ];

    for (name, msg_str) in messages {
        group.bench_with_input(BenchmarkId::new("parse_serialize", name), msg_str, |b, s| {
            b.iter(|| {
                let msg = RawMessage::parse(black_box(s)).unwrap();
                black_box(msg.serialize().unwrap())
            })
        });
    }

    group.finish();
}

fn benchmark_glob(c: &mut Criterion) {
    let mut group = c.benchmark_group("Hostmask Glob");
    let mask = "someone!~ident@host-203-0-113-9.dynamic.example.net";

    for (name, pattern) in [
        ("literal", mask),
        ("catch_all", "*!*@*"),
        ("suffix", "*!*@*.example.net"),
        ("backtracking", "*!*@*-*-*-*-9.*.example.*"),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| black_box(is_match(black_box(pattern), black_box(mask))))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_parsing,
    benchmark_serialization,
    benchmark_construction,
    benchmark_dispatch,
    benchmark_round_trip,
    benchmark_glob,
);

criterion_main!(benches);
