//! Assembly of loose edges into a single connected wire.
//!
//! Edges are consumed in the order given. Each new edge must touch one of the
//! two free ends of the wire built so far; it is flipped when needed and
//! attached at that end. A full circle can only form a wire on its own.

use super::types::{EdgeChain, EdgeCurve};
use super::{KernelOpError, KernelResult};
use crate::geometry::{coincident, Point3};
use std::collections::VecDeque;

/// True when `edge` covers `neighbour` in the opposite direction.
fn retraces(edge: &EdgeCurve, neighbour: &EdgeCurve, tolerance: f64) -> bool {
    coincident(&edge.point_at(0.0), &neighbour.point_at(1.0), tolerance)
        && coincident(&edge.point_at(1.0), &neighbour.point_at(0.0), tolerance)
        && coincident(&edge.point_at(0.5), &neighbour.point_at(0.5), tolerance)
}

pub fn chain_edges(edges: Vec<EdgeCurve>, tolerance: f64) -> KernelResult<EdgeChain> {
    if edges.is_empty() {
        return Err(KernelOpError::InvalidGeometry("wire has no edges".into()));
    }

    let mut chain: VecDeque<EdgeCurve> = VecDeque::with_capacity(edges.len());
    let mut ends: Option<(Point3, Point3)> = None;
    let mut loop_closed = false;

    for (index, edge) in edges.into_iter().enumerate() {
        if loop_closed {
            // Anything touching a closed loop would branch it.
            return Err(KernelOpError::DisconnectedWire(index));
        }

        let Some((start, end)) = edge.endpoints() else {
            if !chain.is_empty() {
                return Err(KernelOpError::DisconnectedWire(index));
            }
            chain.push_back(edge);
            loop_closed = true;
            continue;
        };

        let Some((front, back)) = ends else {
            ends = Some((start, end));
            chain.push_back(edge);
            loop_closed = coincident(&start, &end, tolerance);
            continue;
        };

        let (edge, at_back, front, back) = if coincident(&start, &back, tolerance) {
            (edge, true, front, end)
        } else if coincident(&end, &back, tolerance) {
            (edge.reversed(), true, front, start)
        } else if coincident(&end, &front, tolerance) {
            (edge, false, start, back)
        } else if coincident(&start, &front, tolerance) {
            (edge.reversed(), false, end, back)
        } else {
            return Err(KernelOpError::DisconnectedWire(index));
        };
        let neighbour = if at_back { chain.back() } else { chain.front() };
        // Doubling back meets the free end without enclosing anything.
        let retraced = neighbour.map_or(false, |n| retraces(&edge, n, tolerance));
        if at_back {
            chain.push_back(edge);
        } else {
            chain.push_front(edge);
        }
        ends = Some((front, back));
        loop_closed = !retraced && coincident(&front, &back, tolerance);
    }

    Ok(EdgeChain {
        edges: chain.into_iter().collect(),
        closed: loop_closed,
    })
}
