use crate::model::Amount;
use std::collections::BTreeMap;

const RULE: &str = "----------------------------";

/// 各类别支出合计；没有记录的类别不会出现
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    totals: BTreeMap<String, Amount>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 累加一个类别的金额（同名类别合并）
    pub fn add(&mut self, category: impl Into<String>, amount: Amount) {
        *self.totals.entry(category.into()).or_insert(Amount::ZERO) += amount;
    }

    #[cfg(test)]
    pub fn get(&self, category: &str) -> Option<Amount> {
        self.totals.get(category).copied()
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, Amount)> {
        self.totals.iter().map(|(c, a)| (c.as_str(), *a))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn total(&self) -> Amount {
        self.totals.values().sum()
    }

    /// 汇总弹窗里显示的文本
    pub fn report(&self) -> String {
        let mut text = format!("Expense Summary by Category:\n{}\n", RULE);
        for (category, amount) in self.categories() {
            text.push_str(&format!("{}: {}\n", category, amount));
        }
        text.push_str(&format!("{}\nTotal Spent: {}", RULE, self.total()));
        text
    }
}

impl<S: Into<String>> FromIterator<(S, Amount)> for Summary {
    fn from_iter<I: IntoIterator<Item = (S, Amount)>>(iter: I) -> Self {
        let mut summary = Summary::new();
        for (category, amount) in iter {
            summary.add(category, amount);
        }
        summary
    }
}
