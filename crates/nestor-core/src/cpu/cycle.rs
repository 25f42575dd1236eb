/// Base cost of an instruction and which penalties can apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Cycle {
    /// Fixed cost.
    Normal(u8),
    /// One extra cycle when indexing crosses a page.
    Cross(u8),
    /// One extra cycle when taken, one more when the target is on another page.
    Branch(u8),
}

pub(crate) const fn n(cycle: u8) -> Cycle {
    Cycle::Normal(cycle)
}

pub(crate) const fn c(cycle: u8) -> Cycle {
    Cycle::Cross(cycle)
}

pub(crate) const fn b(cycle: u8) -> Cycle {
    Cycle::Branch(cycle)
}

impl Cycle {
    pub(crate) const fn basic_cycle(&self) -> u64 {
        match self {
            Cycle::Normal(cycle) | Cycle::Cross(cycle) | Cycle::Branch(cycle) => *cycle as u64,
        }
    }

    pub(crate) const fn total_cycle(&self, cross_page: bool, branch_taken: bool) -> u64 {
        let mut total = self.basic_cycle();
        match self {
            Cycle::Normal(_) => {}
            Cycle::Cross(_) => {
                if cross_page {
                    total += 1;
                }
            }
            Cycle::Branch(_) => {
                if branch_taken {
                    total += 1;
                    if cross_page {
                        total += 1;
                    }
                }
            }
        }
        total
    }
}
