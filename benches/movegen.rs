// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use arbiter::core::{Color, PieceKind};
use arbiter::notation;
use arbiter::piece::PieceId;
use arbiter::{Game, MoveRequest};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -";

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("kiwipete-legal-moves-all", |b| {
        let game = Game::from_fen(KIWIPETE).unwrap();
        let ids: Vec<PieceId> = game.player(Color::White).in_play().map(|p| p.id()).collect();
        b.iter(|| {
            let mut game = black_box(&game).clone();
            for &id in &ids {
                black_box(game.generate_moves(id, None));
            }
        });
    });

    c.bench_function("kiwipete-is-in-check", |b| {
        let game = Game::from_fen(KIWIPETE).unwrap();
        b.iter(|| black_box(&game).is_in_check(black_box(Color::Black)));
    });

    c.bench_function("opening-pawn-push", |b| {
        let game = Game::new();
        let request = MoveRequest::new(PieceKind::Pawn, "e4".parse().unwrap());
        b.iter(|| {
            let mut game = black_box(&game).clone();
            game.apply_move(black_box(&request)).unwrap();
        });
    });

    c.bench_function("notation-parse", |b| {
        b.iter(|| notation::parse(black_box("pexd8=q+")).unwrap());
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
