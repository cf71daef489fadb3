//! Table row handling.

use crate::lexer::{Tok, Token};
use crate::nodes::{Block, BlockValue};
use crate::parser::inlines;

/// Split a row line into cells on unescaped `|`. Leading and trailing
/// pipes are consumed; `\|` puts a literal pipe into the cell. Cell tokens
/// come back trimmed of surrounding whitespace.
pub(crate) fn split_row<'s>(toks: &[Token<'s>]) -> Vec<Vec<Token<'s>>> {
    let mut segments: Vec<Vec<Token<'s>>> = vec![Vec::new()];
    let starts_with_pipe = toks
        .iter()
        .find(|t| !t.is_space())
        .map(|t| t.tok == Tok::Pipe)
        .unwrap_or(false);

    let mut i = 0;
    while i < toks.len() && !toks[i].is_break() {
        let t = &toks[i];
        match t.tok {
            Tok::Pipe => segments.push(Vec::new()),
            Tok::Backslash if toks.get(i + 1).map(|n| n.tok) == Some(Tok::Pipe) => {
                segments.last_mut().unwrap().push(toks[i + 1]);
                i += 1;
            }
            _ => segments.last_mut().unwrap().push(*t),
        }
        i += 1;
    }

    for cell in &mut segments {
        trim_cell(cell);
    }

    // The segment before a leading pipe and the one after a trailing pipe
    // are artifacts, not cells.
    if starts_with_pipe && segments.first().map_or(false, |c| c.is_empty()) {
        segments.remove(0);
    }
    if segments.last().map_or(false, |c| c.is_empty()) {
        segments.pop();
    }

    segments
}

fn trim_cell(cell: &mut Vec<Token>) {
    while cell.first().map_or(false, |t| t.is_space()) {
        cell.remove(0);
    }
    while cell.last().map_or(false, |t| t.is_space()) {
        cell.pop();
    }
}

/// Append one row of cells to a table, padding short rows with empty cells
/// and dropping the excess of long ones so `children.len()` stays
/// `ncol * nrow`.
pub(crate) fn append_row(table: &mut Block, ncol: usize, mut cells: Vec<Vec<Token>>) {
    cells.truncate(ncol);
    while cells.len() < ncol {
        cells.push(Vec::new());
    }

    let col = table.start_col;
    for cell in cells {
        let mut block = Block::new(BlockValue::Paragraph, col);
        block.inlines = inlines::parse(&cell);
        block.open = false;
        table.children.push(block);
    }
}
