bitflags::bitflags! {
    /// Presentation flags carried by every stat.
    ///
    /// Output sinks interpret these; the lifecycle controller only looks at
    /// `DISPLAY` (to rename hidden stats) and `INIT` (through the base check).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u16 {
        /// Set by the owner once registration has finished.
        const INIT = 0x0001;
        /// Shown to users.
        const DISPLAY = 0x0002;
        /// Print the total of a vector.
        const TOTAL = 0x0010;
        /// Print the probability distribution.
        const PDF = 0x0020;
        /// Print the cumulative distribution.
        const CDF = 0x0040;
        /// Print the distribution itself.
        const DIST = 0x0080;
        /// Don't print rows whose value is zero.
        const NOZERO = 0x0100;
        /// Don't print rows whose value is NaN.
        const NONAN = 0x0200;
    }
}

impl Flags {
    /// No flags set.
    pub const NONE: Flags = Flags::empty();

    /// The usual flag set for a fully registered, user-visible stat.
    pub const fn visible() -> Flags {
        Flags::INIT.union(Flags::DISPLAY)
    }
}
