//! The operand contract shared by all typed values.

use rimfax_ir::{BitValue, OpGraph, OperandRef};

use crate::error::TypeResult;

/// A typed operand that can participate in expressions and assignments.
///
/// Capturing an operand into an expression always clones its cells into the
/// expression's own graph — operands are plain values, and two expressions
/// built from the same operand never share state. The clones keep the
/// operand's name, which is how the same logical variable unifies across
/// sub-expressions in a compiled objective.
pub trait Operand {
    /// The operand's name.
    fn name(&self) -> &str;

    /// Number of bits.
    fn width(&self) -> usize;

    /// Whether the operand can change width (multi-bit numbers can;
    /// single-bit operands cannot).
    fn is_resizable(&self) -> bool {
        false
    }

    /// Resize to the given width.
    ///
    /// Non-resizable operands fail with [`TypeError::NotResizable`] for any
    /// width other than their own.
    ///
    /// [`TypeError::NotResizable`]: crate::TypeError::NotResizable
    fn resize(&mut self, width: usize) -> TypeResult<()>;

    /// The value of one bit; positions beyond the width read as a
    /// synthetic constant `Zero`.
    fn bit_value(&self, at: usize) -> BitValue;

    /// Clone the operand's cells into a graph, LSB first.
    fn capture(&self, g: &mut OpGraph) -> Vec<OperandRef>;
}
