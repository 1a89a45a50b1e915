//! Pixel connectivity

/// Connectivity type for component analysis and reconstruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityType {
    /// 4-way connectivity (up, down, left, right)
    FourWay,
    /// 8-way connectivity (includes diagonals)
    #[default]
    EightWay,
}

impl ConnectivityType {
    /// Neighbor offsets already visited by a top-left to bottom-right scan.
    pub fn causal_offsets(self) -> &'static [(i32, i32)] {
        match self {
            ConnectivityType::FourWay => &[(-1, 0), (0, -1)],
            ConnectivityType::EightWay => &[(-1, 0), (-1, -1), (0, -1), (1, -1)],
        }
    }

    /// All neighbor offsets.
    pub fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            ConnectivityType::FourWay => &[(-1, 0), (1, 0), (0, -1), (0, 1)],
            ConnectivityType::EightWay => &[
                (-1, -1),
                (0, -1),
                (1, -1),
                (-1, 0),
                (1, 0),
                (-1, 1),
                (0, 1),
                (1, 1),
            ],
        }
    }
}
