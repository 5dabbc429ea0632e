//! the liquidator service: scans lending markets for obligations, revalues
//! them against fresh oracle prices and liquidates the unhealthy ones. the
//! "simple" liquidator expects the operator to hold enough of each borrowed
//! asset on hand to repay the debt it targets.

pub mod prices;
pub mod scan;
pub mod simple;
