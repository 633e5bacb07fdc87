use criterion::{Criterion, criterion_group, criterion_main};

pub fn criterion_benchmark(c: &mut Criterion) {
    use bibdb::lexer::tokenize;
    use bibdb::names::normalize_name_list;
    use bibdb::parser::parse_definitions;
    use bibdb::{Config, Parser};

    let input_bytes = std::fs::read("assets/sample.bib").unwrap();
    let sample = std::str::from_utf8(&input_bytes).unwrap();
    // a larger bibliography, with the cite keys made unique
    let input_str: String = (0..200)
        .map(|i| sample.replace("@book{", &format!("@book{{r{i}")))
        .collect();

    c.bench_function("sample tokenize", |b| b.iter(|| tokenize(&input_str)));

    c.bench_function("sample definitions", |b| {
        b.iter(|| parse_definitions(&input_str))
    });

    c.bench_function("sample database", |b| b.iter(|| bibdb::parse(&input_str)));

    let parser = Parser::new(Config::default().with_normalize_names(false));
    c.bench_function("sample database raw names", |b| {
        b.iter(|| parser.parse(&input_str))
    });

    c.bench_function("sample bytes", |b| {
        b.iter(|| bibdb::parse_bytes(input_str.as_bytes()))
    });

    c.bench_function("name list", |b| {
        b.iter(|| {
            normalize_name_list(
                "Jean Charles~Gabriel de la Vall{\\'e}e~Poussin and van Houten, James and Jones, Jr, James Earl",
                "and",
            )
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
