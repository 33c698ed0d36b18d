/// Every combination of one element per list.
///
/// The first list varies fastest: `[[1, 2, 3], [4, 5]]` gives
/// `[1, 4], [2, 4], [3, 4], [1, 5], [2, 5], [3, 5]`. No lists give one empty
/// combination, any empty list gives none.
pub fn cartesian_product<T: Clone>(lists: &[Vec<T>]) -> Vec<Vec<T>> {
    let Some((head, tail)) = lists.split_first() else {
        return vec![Vec::new()];
    };

    let mut res = Vec::new();
    for rest in cartesian_product(tail) {
        for h in head {
            let mut comb = Vec::with_capacity(rest.len() + 1);
            comb.push(h.clone());
            comb.extend(rest.iter().cloned());
            res.push(comb);
        }
    }

    res
}

/// Lazy counterpart of [`cartesian_product`] over indices: digit `i` counts
/// up to `radices[i]`, the first digit turning fastest.
#[derive(Debug, Clone)]
pub struct Odometer {
    radices: Vec<usize>,
    digits: Vec<usize>,
    limit_reached: bool,
}

impl Odometer {
    pub fn new(radices: Vec<usize>) -> Self {
        Self {
            limit_reached: radices.contains(&0),
            digits: vec![0; radices.len()],
            radices,
        }
    }

    /// Total number of combinations, including those already produced.
    pub fn combinations(&self) -> usize {
        self.radices.iter().product()
    }

    fn increment(&mut self) {
        if self.limit_reached {
            return;
        }

        // NOTE: a digit at or past its radix is a bug
        debug_assert!(self.digits.iter().zip(&self.radices).all(|(d, r)| d < r));

        for (digit, radix) in self.digits.iter_mut().zip(&self.radices) {
            if *digit + 1 < *radix {
                *digit += 1;
                return;
            }

            *digit = 0;
        }

        self.limit_reached = true;
    }
}

impl Iterator for Odometer {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.limit_reached {
            return None;
        }

        let res = self.digits.clone();
        self.increment();

        Some(res)
    }
}
