//! Product-variant composition.
//!
//! A product root declares named options (`color`, `size`, ...) each with an
//! ordered list of values. Every sellable product is one pick of a value per
//! option. This module turns options into products in three pure steps:
//!
//! 1. [`build_placeholders`] maps each option value to an [`OptionPlaceholder`]
//!    carrying its `"Name: Value"` summary and lowercase SKU fragment.
//! 2. [`Combinations`] walks the cartesian product of the placeholder lists.
//!    The first declared option is outermost and the last declared option
//!    cycles fastest, so `[color: red, blue] x [size: S, M]` yields
//!    `red/S, red/M, blue/S, blue/M`.
//! 3. [`materialize`] clones a [`VariantTemplate`] for each combination and
//!    stamps the derived SKU and option summary onto it.
//!
//! The number of variants is the product of the option cardinalities. An
//! option with zero values therefore produces zero variants, while zero
//! options produce exactly one variant whose SKU is the bare prefix. A root
//! may not expand into more than [`MAX_VARIANTS`] products; see
//! [`ensure_variant_limit`].
//!
//! Persistence lives in `storefront_db::catalog`; nothing here touches I/O.

use std::iter::FusedIterator;

use crate::error::CoreError;

/// Largest number of products one product root may expand into.
pub const MAX_VARIANTS: usize = 1_000;

/// Separator between the SKU prefix and each fragment.
pub const SKU_SEPARATOR: &str = "_";

/// Separator between `"Name: Value"` pairs in an option summary.
pub const SUMMARY_SEPARATOR: &str = ", ";

// ---------------------------------------------------------------------------
// Placeholders
// ---------------------------------------------------------------------------

/// Anything that can stand in as an option value during expansion.
///
/// Implemented for plain strings here and for persisted option-value rows in
/// the db crate, so the same engine runs on request input and stored data.
pub trait OptionValueLabel {
    /// The human-facing value, e.g. `"Red"`.
    fn label(&self) -> &str;
}

impl OptionValueLabel for String {
    fn label(&self) -> &str {
        self
    }
}

impl OptionValueLabel for &str {
    fn label(&self) -> &str {
        self
    }
}

/// One option value prepared for expansion. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionPlaceholder<V> {
    /// `"{option name}: {value}"`.
    pub summary: String,
    /// Lowercased value, appended to the SKU prefix.
    pub sku_fragment: String,
    /// The value this placeholder was built from.
    pub original: V,
}

/// Build the placeholders for one option, preserving value order.
pub fn build_placeholders<V>(option_name: &str, values: &[V]) -> Vec<OptionPlaceholder<V>>
where
    V: OptionValueLabel + Clone,
{
    values
        .iter()
        .map(|value| OptionPlaceholder {
            summary: format!("{option_name}: {}", value.label()),
            sku_fragment: value.label().to_lowercase(),
            original: value.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Cartesian expansion
// ---------------------------------------------------------------------------

/// Product of the option cardinalities, or `None` if it overflows `usize`.
pub fn variant_count(cardinalities: impl IntoIterator<Item = usize>) -> Option<usize> {
    cardinalities
        .into_iter()
        .try_fold(1usize, |acc, len| acc.checked_mul(len))
}

/// Reject option sets that would expand into more than [`MAX_VARIANTS`]
/// products. Returns the number of products otherwise.
pub fn ensure_variant_limit(
    cardinalities: impl IntoIterator<Item = usize>,
) -> Result<usize, CoreError> {
    match variant_count(cardinalities) {
        Some(count) if count <= MAX_VARIANTS => Ok(count),
        Some(count) => Err(CoreError::Validation(format!(
            "options would produce {count} products; at most {MAX_VARIANTS} are allowed"
        ))),
        None => Err(CoreError::Validation(format!(
            "options would produce more than {MAX_VARIANTS} products"
        ))),
    }
}

/// One pick of a placeholder per option, in option declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Combination<V> {
    pub summaries: Vec<String>,
    pub sku_fragments: Vec<String>,
    pub originals: Vec<V>,
}

/// Iterator over every [`Combination`] of a set of placeholder lists.
///
/// Keeps one counter per option. After each emitted combination the last
/// counter is incremented; an overflowing counter resets to zero and carries
/// into its left neighbour. A carry out of the first counter ends iteration.
///
/// The size hint is exact unless the number of combinations overflows
/// `usize`, in which case no upper bound is reported.
#[derive(Debug, Clone)]
pub struct Combinations<'a, V> {
    axes: &'a [Vec<OptionPlaceholder<V>>],
    index: Vec<usize>,
    remaining: Option<usize>,
    done: bool,
}

impl<'a, V: Clone> Combinations<'a, V> {
    /// Start a walk over `axes`, one list per option.
    pub fn new(axes: &'a [Vec<OptionPlaceholder<V>>]) -> Self {
        // An empty axis makes the whole product empty; stop before any read.
        let done = axes.iter().any(Vec::is_empty);
        let remaining = if done {
            Some(0)
        } else {
            variant_count(axes.iter().map(Vec::len))
        };
        Self {
            axes,
            index: vec![0; axes.len()],
            remaining,
            done,
        }
    }

    fn current(&self) -> Combination<V> {
        let mut combination = Combination {
            summaries: Vec::with_capacity(self.axes.len()),
            sku_fragments: Vec::with_capacity(self.axes.len()),
            originals: Vec::with_capacity(self.axes.len()),
        };
        for (axis, &position) in self.axes.iter().zip(&self.index) {
            let placeholder = &axis[position];
            combination.summaries.push(placeholder.summary.clone());
            combination
                .sku_fragments
                .push(placeholder.sku_fragment.clone());
            combination.originals.push(placeholder.original.clone());
        }
        combination
    }

    fn advance(&mut self) {
        let mut position = self.index.len();
        loop {
            if position == 0 {
                self.done = true;
                return;
            }
            position -= 1;
            self.index[position] += 1;
            if self.index[position] < self.axes[position].len() {
                return;
            }
            self.index[position] = 0;
        }
    }
}

impl<V: Clone> Iterator for Combinations<'_, V> {
    type Item = Combination<V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let combination = self.current();
        self.advance();
        self.remaining = self.remaining.map(|n| n.saturating_sub(1));
        Some(combination)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(n) => (n, Some(n)),
            None => (usize::MAX, None),
        }
    }
}

impl<V: Clone> FusedIterator for Combinations<'_, V> {}

// ---------------------------------------------------------------------------
// Materialization
// ---------------------------------------------------------------------------

/// A base product that variants are cloned from.
pub trait VariantTemplate: Clone {
    /// SKU of the template; becomes the prefix of every variant SKU.
    fn base_sku(&self) -> &str;

    /// Overwrite the SKU and option summary on a cloned template.
    fn apply_variant(&mut self, sku: String, option_summary: String);
}

/// A materialized product plus the option values that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant<T, V> {
    pub product: T,
    pub option_values: Vec<V>,
}

/// Join a SKU prefix with the fragments of a combination.
pub fn variant_sku(prefix: &str, fragments: &[String]) -> String {
    std::iter::once(prefix)
        .chain(fragments.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(SKU_SEPARATOR)
}

/// Clone `template` and stamp it with the SKU and summary of `combination`.
pub fn materialize<T, V>(template: &T, combination: Combination<V>) -> Variant<T, V>
where
    T: VariantTemplate,
{
    let sku = variant_sku(template.base_sku(), &combination.sku_fragments);
    let option_summary = combination.summaries.join(SUMMARY_SEPARATOR);
    let mut product = template.clone();
    product.apply_variant(sku, option_summary);
    Variant {
        product,
        option_values: combination.originals,
    }
}

/// Run all three steps: placeholders, expansion, materialization.
///
/// `options` yields `(option name, values)` in declaration order. Fails
/// without materializing anything when the options exceed [`MAX_VARIANTS`].
pub fn build_variants<'a, T, V, I>(
    template: &T,
    options: I,
) -> Result<Vec<Variant<T, V>>, CoreError>
where
    T: VariantTemplate,
    V: OptionValueLabel + Clone + 'a,
    I: IntoIterator<Item = (&'a str, &'a [V])>,
{
    let axes: Vec<Vec<OptionPlaceholder<V>>> = options
        .into_iter()
        .map(|(name, values)| build_placeholders(name, values))
        .collect();
    ensure_variant_limit(axes.iter().map(Vec::len))?;
    Ok(Combinations::new(&axes)
        .map(|combination| materialize(template, combination))
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
