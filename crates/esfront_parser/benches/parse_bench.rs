use bumpalo::Bump;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use esfront_ast::FunctionId;
use esfront_core::Source;
use esfront_parser::{parse_script, FunctionDataMap, Parser, ParserOptions, ReparsedFunction};

// A medium-size script (~80 lines) with a spread of statement forms
const SCRIPT_SOURCE: &str = r#"
'use strict';

var registry = {
    users: [],
    nextId: 1,
    get size() { return this.users.length; },
    set size(value) { this.users.length = value; }
};

function User(name, email) {
    this.id = registry.nextId++;
    this.name = name;
    this.email = email;
    this.preferences = { theme: 'light', notifications: true, language: 'en' };
}

User.prototype.describe = function () {
    return this.name + ' <' + this.email + '>';
};

function findUser(id) {
    for (var i = 0; i < registry.users.length; i++) {
        if (registry.users[i].id === id) {
            return registry.users[i];
        }
    }
    return null;
}

function removeUser(id) {
    var index = -1;
    registry.users.forEach(function (user, i) {
        if (user.id === id) index = i;
    });
    if (index < 0) {
        throw new Error('no user ' + id);
    }
    registry.users.splice(index, 1);
}

function classify(user) {
    switch (typeof user.age) {
    case 'number':
        return user.age >= 18 ? 'adult' : 'minor';
    case 'undefined':
        return 'unknown';
    default:
        return 'invalid';
    }
}

function countBy(users, key) {
    var counts = {};
    for (var k in users) {
        var value = users[k][key];
        counts[value] = (counts[value] || 0) + 1;
    }
    return counts;
}

var pattern = /^[a-z]+@[a-z]+\.[a-z]{2,}$/i;

function validate(user) {
    try {
        return pattern.test(user.email) && user.name.length > 0;
    } catch (e) {
        return false;
    } finally {
        registry.checked = (registry.checked | 0) + 1;
    }
}

outer: while (registry.users.length) {
    do {
        if (!validate(registry.users[0])) break outer;
    } while (false);
    removeUser(registry.users[0].id);
}
"#;

fn options() -> ParserOptions {
    ParserOptions {
        lazy_compilation: true,
        ..Default::default()
    }
}

fn bench_parse_script(c: &mut Criterion) {
    let source = Source::new("bench.js", SCRIPT_SOURCE);
    c.bench_function("parse_script_medium", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let outcome = parse_script(&arena, black_box(&source), ParserOptions::default()).unwrap();
            black_box(outcome.program);
        });
    });
}

fn bench_lazy_reparse(c: &mut Criterion) {
    let source = Source::new("bench.js", SCRIPT_SOURCE);
    let recorded: FunctionDataMap = {
        let arena = Bump::new();
        parse_script(&arena, &source, options()).unwrap().recorded
    };
    let Some((&target_id, _)) = recorded.iter().find(|(id, _)| **id != FunctionId::PROGRAM) else {
        return;
    };
    let Some(target) = ReparsedFunction::from_recorded(&recorded, target_id) else {
        return;
    };

    c.bench_function("lazy_reparse_one_function", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let mut parser = Parser::new(&arena, black_box(&source), options());
            parser.set_reparsed_function(target, recorded.clone());
            black_box(parser.parse().unwrap());
        });
    });
}

criterion_group!(benches, bench_parse_script, bench_lazy_reparse);
criterion_main!(benches);
