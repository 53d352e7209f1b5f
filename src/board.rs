//! Go board with incremental group, liberty and hash maintenance.
//!
//! This module provides the rules engine used by both the tree search and
//! the playouts:
//! - a padded 1D grid so neighbor lookups never need bounds checks
//! - stone groups with O(1) liberty counts and atari detection
//! - ko tracking and an incremental Zobrist hash
//! - read-only legality checks and a child-hash preview of any legal move
//!
//! Group handles are plain integers (the index of the group's first stone)
//! and all group data lives in fixed arrays inside the board, so copying a
//! `Board` by value yields a fully independent position.

use std::fmt;
use std::sync::Arc;

use crate::constants::{MAX_BOARD_SIZE, MAX_INTERSECTIONS, MIN_BOARD_SIZE, PASS_MOVE, EMPTY_BOARD_HASH};
use crate::error::GoError;
use crate::group::StoneGroup;
use crate::zobrist::ZobristTable;

/// A point on the board, represented as an index into the padded 1D array.
pub type Point = usize;

/// Handle of a stone group. Equal to the point of the group's head stone.
pub type GroupId = usize;

/// Marker stored in the group map for points that hold no stone.
const NO_GROUP: u16 = u16::MAX;

/// Terminator of the intrusive stone lists (point 0 is always border).
const LIST_END: u16 = 0;

/// The value an intersection might hold.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
    Empty,
    Border,
}

impl Color {
    /// The other player. Empty and border map to themselves.
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
            other => other,
        }
    }

    /// Parse a player name as used by GTP (`b`, `black`, `w`, `white`).
    pub fn parse(s: &str) -> Result<Color, GoError> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "black" => Ok(Color::Black),
            "w" | "white" => Ok(Color::White),
            _ => Err(GoError::InvalidColor { name: s.to_string() }),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::Black => "black",
            Color::White => "white",
            Color::Empty => "empty",
            Color::Border => "border",
        };
        f.write_str(name)
    }
}

/// A Go position.
#[derive(Clone)]
pub struct Board {
    size: usize,
    /// Row stride of the padded grid (`size + 1`).
    stride: usize,
    /// Offsets to the N, E, S, W neighbors.
    offsets: [isize; 4],
    color: [Color; MAX_INTERSECTIONS],
    /// Owning group of every stone, `NO_GROUP` elsewhere.
    group_of: [u16; MAX_INTERSECTIONS],
    /// Next stone of the same group, `LIST_END` for the last one.
    next_stone: [u16; MAX_INTERSECTIONS],
    groups: [StoneGroup; MAX_INTERSECTIONS],
    empties: [u16; MAX_INTERSECTIONS],
    /// Position of every empty point inside `empties`.
    empty_pos: [u16; MAX_INTERSECTIONS],
    empty_count: usize,
    turn: Color,
    ko: Option<Point>,
    black_captures: u32,
    white_captures: u32,
    hash: u64,
    last_move: Option<Point>,
    passes: u32,
    move_number: u32,
    zobrist: Arc<ZobristTable>,
}

impl Board {
    /// Create an empty board of the given side with Black to play.
    pub fn new(size: usize, zobrist: Arc<ZobristTable>) -> Result<Self, GoError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(GoError::InvalidBoardSize { size });
        }
        let stride = size + 1;
        let mut board = Board {
            size,
            stride,
            offsets: [-(stride as isize), 1, stride as isize, -1],
            color: [Color::Border; MAX_INTERSECTIONS],
            group_of: [NO_GROUP; MAX_INTERSECTIONS],
            next_stone: [LIST_END; MAX_INTERSECTIONS],
            groups: [StoneGroup::default(); MAX_INTERSECTIONS],
            empties: [0; MAX_INTERSECTIONS],
            empty_pos: [0; MAX_INTERSECTIONS],
            empty_count: 0,
            turn: Color::Black,
            ko: None,
            black_captures: 0,
            white_captures: 0,
            hash: EMPTY_BOARD_HASH,
            last_move: None,
            passes: 0,
            move_number: 0,
            zobrist,
        };
        for pt in 0..MAX_INTERSECTIONS {
            let x = pt % stride;
            let y = pt / stride;
            if x < size && (1..=size).contains(&y) {
                board.color[pt] = Color::Empty;
                board.push_empty(pt);
            }
        }
        Ok(board)
    }

    /// Reset to the empty board of the same size.
    pub fn clear(&mut self) {
        let zobrist = Arc::clone(&self.zobrist);
        // The size was validated when this board was built.
        if let Ok(fresh) = Board::new(self.size, zobrist) {
            *self = fresh;
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Player to move.
    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Point where the player to move may not play because of ko.
    #[inline]
    pub fn ko(&self) -> Option<Point> {
        self.ko
    }

    /// Position hash covering stones, ko and turn.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Number of stones captured by `player`.
    pub fn captures(&self, player: Color) -> u32 {
        match player {
            Color::Black => self.black_captures,
            Color::White => self.white_captures,
            _ => 0,
        }
    }

    /// Last move played (`Some(PASS_MOVE)` for a pass), `None` on a fresh board.
    #[inline]
    pub fn last_move(&self) -> Option<Point> {
        self.last_move
    }

    /// Number of consecutive passes ending the move sequence.
    #[inline]
    pub fn passes(&self) -> u32 {
        self.passes
    }

    #[inline]
    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    #[inline]
    pub fn color_at(&self, pt: Point) -> Color {
        self.color[pt]
    }

    pub fn zobrist(&self) -> &Arc<ZobristTable> {
        &self.zobrist
    }

    /// The group owning the stone at `pt`, if any.
    #[inline]
    pub fn group_at(&self, pt: Point) -> Option<GroupId> {
        match self.group_of[pt] {
            NO_GROUP => None,
            g => Some(g as GroupId),
        }
    }

    #[inline]
    pub fn group(&self, id: GroupId) -> &StoneGroup {
        &self.groups[id]
    }

    /// Iterate over the stones of a group.
    pub fn stones(&self, id: GroupId) -> Stones<'_> {
        Stones {
            next_stone: &self.next_stone,
            current: id as u16,
        }
    }

    /// Liberties of a group, enumerated from the board (sorted, distinct).
    pub fn liberty_points(&self, id: GroupId) -> Vec<Point> {
        let mut libs: Vec<Point> = self
            .stones(id)
            .flat_map(|s| self.neighbors(s))
            .filter(|&n| self.color[n] == Color::Empty)
            .collect();
        libs.sort_unstable();
        libs.dedup();
        libs
    }

    /// Number of empty points.
    #[inline]
    pub fn empty_count(&self) -> usize {
        self.empty_count
    }

    /// The empty point stored at slot `idx` of the empties list.
    #[inline]
    pub fn empty_at(&self, idx: usize) -> Point {
        debug_assert!(idx < self.empty_count);
        self.empties[idx] as Point
    }

    /// Iterate over all empty points (unordered).
    pub fn empties(&self) -> impl Iterator<Item = Point> + '_ {
        self.empties[..self.empty_count].iter().map(|&p| p as Point)
    }

    /// Iterate over every playable point of the board.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.size).flat_map(move |y| (0..self.size).map(move |x| self.point(x, y)))
    }

    /// Point for the column `x` and row `y`, both in `0..size`.
    #[inline]
    pub fn point(&self, x: usize, y: usize) -> Point {
        assert!(x < self.size && y < self.size, "({x}, {y}) is off a {} board", self.size);
        (y + 1) * self.stride + x
    }

    #[inline]
    pub fn x_of(&self, pt: Point) -> usize {
        pt % self.stride
    }

    #[inline]
    pub fn y_of(&self, pt: Point) -> usize {
        pt / self.stride - 1
    }

    /// True for points inside the playable area.
    #[inline]
    pub fn is_on_board(&self, pt: Point) -> bool {
        pt < MAX_INTERSECTIONS && self.color[pt] != Color::Border
    }

    /// The 4 orthogonal neighbors (N, E, S, W) of a point.
    #[inline]
    pub fn neighbors(&self, pt: Point) -> [Point; 4] {
        self.offsets.map(|d| (pt as isize + d) as Point)
    }

    // -------------------------------------------------------------------------
    // Legality
    // -------------------------------------------------------------------------

    /// Check whether the player to move may play at `pt`.
    ///
    /// A move is legal on an empty, non-ko point that touches an empty point,
    /// captures an adjacent opponent group, or joins a friendly group that
    /// keeps another liberty. The board is never modified.
    pub fn is_legal(&self, pt: Point) -> bool {
        if pt >= MAX_INTERSECTIONS || self.color[pt] != Color::Empty {
            return false;
        }
        if self.ko == Some(pt) {
            return false;
        }
        for n in self.neighbors(pt) {
            match self.color[n] {
                Color::Empty => return true,
                Color::Border => {}
                c => {
                    let group = &self.groups[self.group_of[n] as usize];
                    // `pt` is a liberty of every adjacent group.
                    if c == self.turn && !group.is_atari() {
                        return true;
                    }
                    if c != self.turn && group.is_atari() {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Like [`Board::is_legal`], but also rejects filling a point whose
    /// neighbors all belong to the player to move, unless one of those
    /// groups is in atari.
    pub fn is_legal_no_eye_filling(&self, pt: Point) -> bool {
        if !self.is_legal(pt) {
            return false;
        }
        for n in self.neighbors(pt) {
            match self.color[n] {
                Color::Empty => return true,
                Color::Border => {}
                c if c != self.turn => return true,
                _ => {
                    if self.groups[self.group_of[n] as usize].is_atari() {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// True when the player to move has no legal point and must pass.
    pub fn must_pass(&self) -> bool {
        !self.empties().any(|pt| self.is_legal(pt))
    }

    // -------------------------------------------------------------------------
    // Moves
    // -------------------------------------------------------------------------

    /// Play at `pt` for the player to move.
    ///
    /// # Panics
    /// If the move is illegal. Callers check legality first.
    pub fn play(&mut self, pt: Point) {
        assert!(
            self.is_legal(pt),
            "illegal move at {pt} for {}\n{self}",
            self.turn
        );
        let turn = self.turn;
        let opponent = turn.opponent();

        self.clear_ko();
        self.place_stone(pt, turn);

        // Merge friendly groups into the new stone's group.
        let mut current = pt;
        for n in self.neighbors(pt) {
            if self.color[n] != turn {
                continue;
            }
            let g = self.group_of[n] as GroupId;
            if g == current {
                continue;
            }
            self.groups[g].remove_liberty(pt);
            current = self.merge(current, g);
        }

        // Take the liberty away from opponent groups and capture dead ones.
        let mut seen = [NO_GROUP; 4];
        let mut captured = 0u32;
        let mut ko_point = PASS_MOVE;
        for (k, n) in self.neighbors(pt).into_iter().enumerate() {
            if self.color[n] != opponent {
                continue;
            }
            let g = self.group_of[n];
            if seen[..k].contains(&g) {
                continue;
            }
            seen[k] = g;

            let g = g as GroupId;
            self.groups[g].remove_liberty(pt);
            if self.groups[g].is_captured() {
                captured += self.groups[g].stones as u32;
                ko_point = n;
                self.capture(g, turn);
            }
        }

        if captured > 0 {
            match turn {
                Color::Black => self.black_captures += captured,
                _ => self.white_captures += captured,
            }
        }
        if captured == 1 && self.groups[current].stones == 1 {
            self.set_ko(ko_point);
        }

        self.end_turn();
        self.last_move = Some(pt);
        self.passes = 0;
    }

    /// Pass: swap the turn and clear any ko.
    pub fn pass(&mut self) {
        self.clear_ko();
        self.end_turn();
        self.last_move = Some(PASS_MOVE);
        self.passes += 1;
    }

    /// Play `pt`, or pass when `pt` is [`PASS_MOVE`].
    pub fn play_or_pass(&mut self, pt: Point) {
        if pt == PASS_MOVE {
            self.pass();
        } else {
            self.play(pt);
        }
    }

    /// The hash this board would have after playing `pt`, computed without
    /// modifying the board.
    ///
    /// # Panics
    /// If the move is illegal.
    pub fn child_hash(&self, pt: Point) -> u64 {
        assert!(self.is_legal(pt), "child hash of illegal move at {pt}\n{self}");
        let zobrist = &*self.zobrist;
        let turn = self.turn;
        let opponent = turn.opponent();

        let mut hash = self.hash;
        if let Some(ko) = self.ko {
            hash ^= zobrist.ko(ko);
        }
        hash ^= zobrist.stone(turn, pt);

        let mut seen = [NO_GROUP; 4];
        let mut captured = 0u32;
        let mut ko_point = PASS_MOVE;
        let mut friendly = false;
        for (k, n) in self.neighbors(pt).into_iter().enumerate() {
            let c = self.color[n];
            if c == turn {
                friendly = true;
                continue;
            }
            if c != opponent {
                continue;
            }
            let g = self.group_of[n];
            if seen[..k].contains(&g) {
                continue;
            }
            seen[k] = g;

            let g = g as GroupId;
            if self.groups[g].is_atari() {
                captured += self.groups[g].stones as u32;
                ko_point = n;
                for s in self.stones(g) {
                    hash ^= zobrist.stone(opponent, s);
                }
            }
        }

        if captured == 1 && !friendly {
            hash ^= zobrist.ko(ko_point);
        }
        hash ^ zobrist.turn()
    }

    /// The hash this board would have after a pass.
    pub fn pass_hash(&self) -> u64 {
        let mut hash = self.hash ^ self.zobrist.turn();
        if let Some(ko) = self.ko {
            hash ^= self.zobrist.ko(ko);
        }
        hash
    }

    // -------------------------------------------------------------------------
    // Scoring
    // -------------------------------------------------------------------------

    /// Tromp-Taylor area score from Black's point of view (Black minus White).
    ///
    /// Only meaningful on a finished position where dead stones are removed
    /// and neutral points are filled. An empty point counts for Black when
    /// its west or east neighbor is black and for White otherwise.
    pub fn tromp_taylor_score(&self) -> i32 {
        let mut score = 0i32;
        for pt in self.points() {
            match self.color[pt] {
                Color::Black => score += 1,
                Color::White => score -= 1,
                Color::Empty => {
                    if self.color[pt - 1] == Color::Black || self.color[pt + 1] == Color::Black {
                        score += 1;
                    } else {
                        score -= 1;
                    }
                }
                Color::Border => {}
            }
        }
        score
    }

    // -------------------------------------------------------------------------
    // Coordinates
    // -------------------------------------------------------------------------

    /// Name of a point, e.g. `"D4"`, or `"pass"`.
    ///
    /// Columns are lettered from `A`, skipping `I`; rows are numbered from 1.
    pub fn point_name(&self, pt: Point) -> String {
        if pt == PASS_MOVE {
            return "pass".into();
        }
        assert!(self.is_on_board(pt), "point {pt} is off a {} board", self.size);

        let mut col = b'A' + self.x_of(pt) as u8;
        if col >= b'I' {
            col += 1;
        }
        format!("{}{}", col as char, self.y_of(pt) + 1)
    }

    /// Parse a point name (case-insensitive) or `"pass"`.
    pub fn parse_point(&self, name: &str) -> Result<Point, GoError> {
        let invalid = || GoError::InvalidCoordinate {
            name: name.to_string(),
        };
        if name.eq_ignore_ascii_case("pass") {
            return Ok(PASS_MOVE);
        }

        let mut chars = name.chars();
        let col = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
        if !col.is_ascii_uppercase() || col == 'I' {
            return Err(invalid());
        }
        let mut x = (col as u8 - b'A') as usize;
        if col > 'I' {
            x -= 1;
        }

        let row = chars.as_str();
        if row.is_empty() || !row.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let row: usize = row.parse().map_err(|_| invalid())?;
        if x >= self.size || row == 0 || row > self.size {
            return Err(invalid());
        }
        Ok(self.point(x, row - 1))
    }

    // -------------------------------------------------------------------------
    // Internal bookkeeping
    // -------------------------------------------------------------------------

    fn end_turn(&mut self) {
        self.turn = self.turn.opponent();
        self.hash ^= self.zobrist.turn();
        self.move_number += 1;
    }

    fn set_ko(&mut self, pt: Point) {
        self.ko = Some(pt);
        self.hash ^= self.zobrist.ko(pt);
    }

    fn clear_ko(&mut self) {
        if let Some(ko) = self.ko.take() {
            self.hash ^= self.zobrist.ko(ko);
        }
    }

    fn push_empty(&mut self, pt: Point) {
        self.empties[self.empty_count] = pt as u16;
        self.empty_pos[pt] = self.empty_count as u16;
        self.empty_count += 1;
    }

    fn remove_empty(&mut self, pt: Point) {
        let idx = self.empty_pos[pt] as usize;
        self.empty_count -= 1;
        let last = self.empties[self.empty_count];
        self.empties[idx] = last;
        self.empty_pos[last as usize] = idx as u16;
    }

    /// Put a stone on an empty point as a new one-stone group with its
    /// empty neighbors as liberties.
    fn place_stone(&mut self, pt: Point, color: Color) {
        debug_assert!(self.groups[pt].is_free(), "group slot {pt} still in use");
        self.color[pt] = color;
        self.hash ^= self.zobrist.stone(color, pt);
        self.remove_empty(pt);

        self.group_of[pt] = pt as u16;
        self.next_stone[pt] = LIST_END;
        let mut group = StoneGroup::singleton();
        for n in self.neighbors(pt) {
            if self.color[n] == Color::Empty {
                group.add_liberty(n);
            }
        }
        self.groups[pt] = group;
    }

    /// Merge two friendly groups; the smaller one is absorbed into the larger.
    /// Returns the handle of the surviving group.
    fn merge(&mut self, a: GroupId, b: GroupId) -> GroupId {
        let (base, absorbed) = if self.groups[b].stones > self.groups[a].stones {
            (b, a)
        } else {
            (a, b)
        };

        // Relabel absorbed stones one by one. A liberty of an absorbed stone
        // is new to `base` only if no other `base` stone touches it yet.
        let mut stone = absorbed;
        let mut tail = absorbed;
        while stone != LIST_END as Point {
            self.group_of[stone] = base as u16;
            for n in self.neighbors(stone) {
                if self.color[n] == Color::Empty && self.touching(n, base) == 1 {
                    self.groups[base].add_liberty(n);
                }
            }
            tail = stone;
            stone = self.next_stone[stone] as Point;
        }

        // Splice the absorbed list right after the base head.
        self.next_stone[tail] = self.next_stone[base];
        self.next_stone[base] = absorbed as u16;

        self.groups[base].stones += self.groups[absorbed].stones;
        self.groups[absorbed] = StoneGroup::default();
        base
    }

    /// Number of stones of group `g` adjacent to `pt`.
    #[inline]
    fn touching(&self, pt: Point, g: GroupId) -> usize {
        self.neighbors(pt)
            .iter()
            .filter(|&&n| self.group_of[n] as GroupId == g)
            .count()
    }

    /// Remove every stone of group `g`, giving each vacated point as a
    /// liberty to the adjacent groups of `capturer`.
    fn capture(&mut self, g: GroupId, capturer: Color) {
        let dead = self.color[g];
        let mut stone = g;
        while stone != LIST_END as Point {
            let next = self.next_stone[stone] as Point;

            self.color[stone] = Color::Empty;
            self.hash ^= self.zobrist.stone(dead, stone);
            self.group_of[stone] = NO_GROUP;
            self.next_stone[stone] = LIST_END;
            self.push_empty(stone);

            let mut seen = [NO_GROUP; 4];
            for (k, n) in self.neighbors(stone).into_iter().enumerate() {
                if self.color[n] != capturer {
                    continue;
                }
                let owner = self.group_of[n];
                if seen[..k].contains(&owner) {
                    continue;
                }
                seen[k] = owner;
                self.groups[owner as usize].add_liberty(stone);
            }

            stone = next;
        }
        self.groups[g] = StoneGroup::default();
    }
}

/// Iterator over the stones of one group.
pub struct Stones<'a> {
    next_stone: &'a [u16; MAX_INTERSECTIONS],
    current: u16,
}

impl Iterator for Stones<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.current == LIST_END {
            return None;
        }
        let stone = self.current as Point;
        self.current = self.next_stone[stone];
        Some(stone)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ko = self.ko.map_or_else(|| "-".to_string(), |k| self.point_name(k));
        writeln!(
            f,
            "{} to play, ko {ko}, captures B {} W {}, hash {:016x}",
            self.turn, self.black_captures, self.white_captures, self.hash
        )?;

        write!(f, "   ")?;
        for x in 0..self.size {
            let mut col = b'A' + x as u8;
            if col >= b'I' {
                col += 1;
            }
            write!(f, "{} ", col as char)?;
        }
        writeln!(f)?;

        for y in (0..self.size).rev() {
            write!(f, "{:>2} ", y + 1)?;
            for x in 0..self.size {
                let ch = match self.color[self.point(x, y)] {
                    Color::Black => 'X',
                    Color::White => 'O',
                    Color::Empty => '.',
                    Color::Border => '#',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
