// ABOUTME: Benchmark suite for the MEP2 parser pipeline
// ABOUTME: Measures line framing, string decoding, and address parsing throughput

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mep2::{decode_string, Date, PduParser, RawAddress};

fn bench_single_line_pdu(c: &mut Criterion) {
    c.bench_function("parse_single_line_pdu", |b| {
        let mut parser = PduParser::new();
        b.iter(|| {
            parser.reset();
            parser
                .parse_line(black_box(b"/create*02CD\r\n"))
                .expect("valid PDU");
            parser.extract_pdu().expect("complete")
        });
    });
}

fn bench_envelope_pdu(c: &mut Criterion) {
    let lines: [&[u8]; 6] = [
        b"/env\r\n",
        b"To: Gandalf the Gray %2F 111-1111 (BOARD, RECEIPT)\r\n",
        b" EMS: INTERNET\r\n",
        b" MBX: gandalf@hobbiton.org\r\n",
        b"Subject: Concerning hobbits\r\n",
        b"/end env*ZZZZ\r\n",
    ];

    c.bench_function("parse_envelope_pdu", |b| {
        let mut parser = PduParser::new();
        b.iter(|| {
            parser.reset();
            for line in lines {
                parser.parse_line(black_box(line)).expect("valid PDU");
            }
            parser.extract_pdu().expect("complete")
        });
    });
}

fn bench_decode_string(c: &mut Criterion) {
    let input = b"Nov 01 11:58 John Weaver        Organizational Change%2FEn      869\r\n";
    c.bench_function("decode_string", |b| {
        b.iter(|| decode_string(black_box(input)).expect("valid input"));
    });
}

fn bench_address_first_line(c: &mut Criterion) {
    c.bench_function("address_first_line", |b| {
        b.iter(|| {
            let mut address = RawAddress::default();
            address
                .parse_first_line(black_box(
                    "Gandalf the Gray / Org: The Good Guys / Loc: Hobbiton (BOARD, RECEIPT)",
                ))
                .expect("valid address");
            address
        });
    });
}

fn bench_date_parse(c: &mut Criterion) {
    c.bench_function("date_parse", |b| {
        b.iter(|| Date::parse(black_box("Sun Aug 11, 2024 12:00 AM PST")).expect("valid date"));
    });
}

criterion_group!(
    benches,
    bench_single_line_pdu,
    bench_envelope_pdu,
    bench_decode_string,
    bench_address_first_line,
    bench_date_parse
);
criterion_main!(benches);
