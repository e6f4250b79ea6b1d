// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pretty printers for reporting information.
//!
//! Related lines are grouped into blocks and drawn as a small tree under a
//! bold title. Warnings are collected while the configuration is being read
//! and only displayed once, just before any work starts.

use std::{borrow::Cow, sync::Mutex};

use log::Level;

const VERTICAL: char = '│';
const UP_AND_RIGHT: char = '└';
const VERTICAL_AND_RIGHT: char = '├';

lazy_static::lazy_static! {
    static ref WARNINGS: Mutex<Vec<Vec<Cow<'static, str>>>> = Mutex::new(vec![]);
}

type Block = Vec<Cow<'static, str>>;

fn draw(level: Level, title: &str, blocks: &[Block]) {
    log::log!(level, "{}", console::style(title).bold());
    let num_blocks = blocks.len();
    for (i_block, block) in blocks.iter().enumerate() {
        let num_lines = block.len();
        for (i_line, line) in block.iter().enumerate() {
            let symbol = match (i_line, i_line + 1 == num_lines, i_block + 1 == num_blocks) {
                (0, true, true) => UP_AND_RIGHT,
                (0, _, _) => VERTICAL_AND_RIGHT,
                _ => VERTICAL,
            };
            log::log!(level, "{symbol} {line}");
        }
    }
    log::log!(level, "");
}

pub(crate) struct InfoPrinter {
    title: Cow<'static, str>,
    blocks: Vec<Block>,
}

impl InfoPrinter {
    pub(crate) fn new(title: Cow<'static, str>) -> Self {
        Self {
            title,
            blocks: vec![],
        }
    }

    pub(crate) fn push_line(&mut self, line: Cow<'static, str>) {
        self.blocks.push(vec![line]);
    }

    pub(crate) fn push_block(&mut self, block: Block) {
        if !block.is_empty() {
            self.blocks.push(block);
        }
    }

    pub(crate) fn display(self) {
        draw(Level::Info, &self.title, &self.blocks);
    }
}

pub(crate) trait Warn {
    fn warn(self);
}

impl Warn for &'static str {
    fn warn(self) {
        Cow::Borrowed(self).warn();
    }
}

impl Warn for String {
    fn warn(self) {
        Cow::<'static, str>::Owned(self).warn();
    }
}

impl Warn for Cow<'static, str> {
    fn warn(self) {
        vec![self].warn();
    }
}

impl Warn for Vec<Cow<'static, str>> {
    fn warn(self) {
        match WARNINGS.lock() {
            Ok(mut w) => w.push(self),
            // Someone panicked while holding the lock; don't lose the warning.
            Err(_) => self.into_iter().for_each(|l| log::warn!("{l}")),
        }
    }
}

/// Print out any warnings that have been collected so far, then forget them.
pub(crate) fn display_warnings() {
    log::debug!("Displaying warnings");
    let blocks = match WARNINGS.lock() {
        Ok(mut w) => std::mem::take(&mut *w),
        Err(_) => return,
    };
    if blocks.is_empty() {
        return;
    }
    draw(Level::Warn, "Warnings", &blocks);
}
