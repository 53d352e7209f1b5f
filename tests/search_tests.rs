//! Integration tests for the tree search.

use std::collections::HashSet;
use std::sync::Arc;

use gaugo::board::{Board, Color, Point};
use gaugo::constants::PASS_MOVE;
use gaugo::mcts::{SuperkoWindow, UctSearch, search_move};
use gaugo::options::Options;
use gaugo::playout::{AmafMap, PlayoutPolicy, PureRandom, winner};
use gaugo::stoppers::SearchView;
use gaugo::zobrist::ZobristTable;

fn new_board(size: usize) -> Board {
    Board::new(size, Arc::new(ZobristTable::default())).unwrap()
}

/// Play moves and return the board with the hashes of the positions before
/// each move.
fn setup_game(size: usize, moves: &[&str]) -> (Board, Vec<u64>) {
    let mut board = new_board(size);
    let mut history = Vec::new();
    for mv in moves {
        let pt = board.parse_point(mv).unwrap();
        history.push(board.hash());
        board.play_or_pass(pt);
    }
    (board, history)
}

fn options() -> Options {
    Options {
        board_size: 5,
        pool_nodes: 50_000,
        pool_blocks: 2,
        komi: 0.5,
        simulations: 300,
        verbosity: 0,
        seed: Some(42),
        ..Options::default()
    }
}

fn pt_of(board: &Board, name: &str) -> Point {
    board.parse_point(name).unwrap()
}

fn stop_at(n: u32) -> impl FnMut(&SearchView<'_>, u32) -> bool {
    move |_: &SearchView<'_>, sims: u32| sims >= n
}

fn root_moves<P, S>(search: &UctSearch<P, S>) -> Vec<Point>
where
    P: gaugo::playout::PlayoutPolicy,
    S: gaugo::stoppers::StopPredicate,
{
    let tree = search.tree();
    tree.children(tree.root()).map(|c| tree.node(c).mv).collect()
}

#[test]
fn test_root_children_are_legal_and_distinct() {
    let (board, history) = setup_game(5, &["C3", "B2", "D4"]);
    let mut search = UctSearch::new(&board, &history, &options(), PureRandom::with_seed(1), stop_at(50));
    search.run();

    let moves = root_moves(&search);
    let distinct: HashSet<Point> = moves.iter().copied().collect();
    assert_eq!(distinct.len(), moves.len());
    for &mv in &moves {
        assert!(mv == PASS_MOVE || board.is_legal_no_eye_filling(mv));
    }
    // 22 empty points, all playable.
    assert_eq!(moves.len(), 22);
}

#[test]
fn test_pass_child_depends_on_cap() {
    let board = new_board(5);
    let generous = Options {
        pass_cap: 30,
        ..options()
    };
    let mut search = UctSearch::new(&board, &[], &generous, PureRandom::with_seed(1), stop_at(1));
    search.run();
    let moves = root_moves(&search);
    assert_eq!(moves.len(), 26);
    assert_eq!(moves.last(), Some(&PASS_MOVE));

    let strict = Options {
        pass_cap: 0,
        ..options()
    };
    let mut search = UctSearch::new(&board, &[], &strict, PureRandom::with_seed(1), stop_at(1));
    search.run();
    assert!(!root_moves(&search).contains(&PASS_MOVE));
}

#[test]
fn test_search_never_repeats_recent_positions() {
    let (board, history) = setup_game(5, &["C3", "C4", "D4", "D3"]);
    // Pretend the positions after two root moves were seen recently.
    let banned = [board.parse_point("B2").unwrap(), board.parse_point("E5").unwrap()];
    let mut history = history;
    for &mv in &banned {
        history.push(board.child_hash(mv));
    }
    history.push(board.hash());

    let mut search = UctSearch::new(&board, &history, &options(), PureRandom::with_seed(9), stop_at(200));
    let best = search.run();
    let moves = root_moves(&search);
    for mv in banned {
        assert!(!moves.contains(&mv));
        assert_ne!(best, mv);
    }

    let window = SuperkoWindow::from_history(&history);
    assert!(best == PASS_MOVE || !window.contains(board.child_hash(best)));
}

#[test]
fn test_stop_predicate_controls_length() {
    let board = new_board(5);
    let mut search = UctSearch::new(&board, &[], &options(), PureRandom::with_seed(4), stop_at(123));
    search.run();
    assert_eq!(search.simulations(), 123);
    let tree = search.tree();
    assert_eq!(tree.node(tree.root()).played, 123);
}

#[test]
fn test_visits_are_conserved() {
    let board = new_board(5);
    let opts = options();
    let mut search = UctSearch::new(&board, &[], &opts, PureRandom::with_seed(4), stop_at(500));
    search.run();

    let tree = search.tree();
    let root = tree.root();
    let child_visits: u32 = tree.children(root).map(|c| tree.node(c).played).sum();
    assert_eq!(child_visits, 500 - opts.expansion_visits);
    for child in tree.children(root) {
        let node = tree.node(child);
        assert!(node.wins_black <= node.played);
        assert!(node.amaf_wins_black <= node.amaf_played);
        let below: u32 = tree.children(child).map(|c| tree.node(c).played).sum();
        assert!(below <= node.played);
    }
}

#[test]
fn test_same_seed_same_answer() {
    let (board, history) = setup_game(5, &["C3"]);
    let first = search_move(&board, &history, &options());
    let second = search_move(&board, &history, &options());
    assert_eq!(first, second);
    assert!(board.is_legal(first));
}

#[test]
fn test_game_over_returns_pass() {
    let (board, history) = setup_game(5, &["C3", "pass", "pass"]);
    assert_eq!(board.passes(), 2);
    assert_eq!(search_move(&board, &history, &options()), PASS_MOVE);

    let mut search = UctSearch::new(&board, &history, &options(), PureRandom::with_seed(1), stop_at(10));
    assert_eq!(search.run(), PASS_MOVE);
    // Nothing was expanded.
    assert_eq!(search.tree().len(), 1);
}

#[test]
fn test_diagnostics_are_read_only_views() {
    let board = new_board(5);
    let mut search = UctSearch::new(&board, &[], &options(), PureRandom::with_seed(8), stop_at(200));
    let best = search.run();

    let pv = search.principal_variation(4);
    assert_eq!(pv.first(), Some(&best));

    let stats = search.root_stats();
    let most = stats.iter().map(|s| s.played).max().unwrap();
    let chosen = stats.iter().find(|s| s.mv == best).unwrap();
    assert_eq!(chosen.played, most);
    assert!(chosen.winrate.is_some());

    let view = search.view();
    assert!(view.root_winrate().is_some());
    assert!(view.pv_string(4).starts_with(&board.point_name(best)));
}

/// A playout that leaves the board alone, records a fixed list of moves and
/// reports a scripted winner.
struct Scripted {
    moves: Vec<(Point, Color)>,
    winner_of: fn(u32) -> Color,
    calls: u32,
}

impl PlayoutPolicy for Scripted {
    fn playout(&mut self, _: &mut Board, _: f32, amaf: &mut AmafMap) -> Color {
        for &(pt, color) in &self.moves {
            amaf.record(pt, color);
        }
        let result = (self.winner_of)(self.calls);
        self.calls += 1;
        result
    }
}

fn alternate(call: u32) -> Color {
    if call % 2 == 0 { Color::Black } else { Color::White }
}

#[test]
fn test_amaf_credits_only_moves_of_side_to_move() {
    let with_pass = Options {
        pass_cap: 30,
        ..options()
    };
    for moves in [&[][..], &["C3"][..]] {
        let (board, history) = setup_game(5, moves);
        let mover = board.turn();
        let ours = pt_of(&board, "E5");
        let theirs = pt_of(&board, "D4");
        let contested = pt_of(&board, "B2");
        let policy = Scripted {
            moves: vec![
                (ours, mover),
                (theirs, mover.opponent()),
                (contested, mover.opponent()),
                (contested, mover),
                (PASS_MOVE, mover),
            ],
            winner_of: alternate,
            calls: 0,
        };
        // Fewer simulations than the expansion threshold: every one is a
        // playout straight from the root.
        let sims = 6;
        assert!(sims < with_pass.expansion_visits);
        let mut search = UctSearch::new(&board, &history, &with_pass, policy, stop_at(sims));
        search.run();

        let tree = search.tree();
        assert!(root_moves(&search).contains(&PASS_MOVE));
        for child in tree.children(tree.root()) {
            let node = tree.node(child);
            assert_eq!(node.played, 0);
            if node.mv == ours {
                assert_eq!(node.amaf_played, sims);
                assert_eq!(node.amaf_wins_black, sims / 2);
            } else {
                assert_eq!(node.amaf_played, 0, "{}", board.point_name(node.mv));
                assert_eq!(node.amaf_wins_black, 0);
            }
        }
    }
}

#[test]
fn test_pass_after_pass_is_scored_in_tree() {
    // Black C3 alone; White passed, so a Black pass ends the game.
    let (board, history) = setup_game(5, &["C3", "pass"]);
    assert_eq!(board.passes(), 1);
    let mut finished = board.clone();
    finished.pass();
    assert_eq!(winner(&finished, options().komi), Color::Black);

    let with_pass = Options {
        pass_cap: 30,
        ..options()
    };
    let policy = Scripted {
        moves: Vec::new(),
        winner_of: |_| Color::White,
        calls: 0,
    };
    let mut search = UctSearch::new(&board, &history, &with_pass, policy, stop_at(120));
    let best = search.run();

    let tree = search.tree();
    let pass = tree
        .children(tree.root())
        .find(|&c| tree.node(c).mv == PASS_MOVE)
        .unwrap();
    let node = tree.node(pass);
    // Every playout says White, so Black wins only when the game is scored
    // directly after the second pass.
    assert!(node.played > 1);
    assert_eq!(node.wins_black, node.played);
    assert!(!tree.is_expanded(pass));
    assert_eq!(best, PASS_MOVE);
}
