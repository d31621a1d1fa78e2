//! Node builders. Ids are positions in construction order.

use std::collections::HashSet;

use crate::graph::{Node, NodeGroup};
use crate::track::{Artist, ArtistRef, TrackFeature};

fn node(id: usize, guid: &str, label: &str, group: NodeGroup) -> Node {
    Node {
        id,
        guid: guid.to_string(),
        label: label.to_string(),
        group,
        shape: group.into(),
    }
}

/// One song node per track, in input order.
pub fn track_nodes(tracks: &[TrackFeature]) -> Vec<Node> {
    tracks
        .iter()
        .enumerate()
        .map(|(id, track)| node(id, &track.id, &track.name, NodeGroup::Song))
        .collect()
}

/// One artist node per artist, in input order.
pub fn artist_nodes(artists: &[Artist]) -> Vec<Node> {
    artists
        .iter()
        .enumerate()
        .map(|(id, artist)| node(id, &artist.id, &artist.name, NodeGroup::Artist))
        .collect()
}

/// Artists credited on `tracks`, deduplicated by id, in first-seen order.
pub fn distinct_artists(tracks: &[TrackFeature]) -> Vec<&ArtistRef> {
    let mut seen = HashSet::new();
    tracks
        .iter()
        .flat_map(TrackFeature::artists)
        .filter(|artist| seen.insert(artist.id.as_str()))
        .collect()
}

/// Song nodes `0..n` followed by one artist node per distinct credited
/// artist, `n..n+m`.
pub fn track_and_artist_nodes(tracks: &[TrackFeature]) -> Vec<Node> {
    let mut nodes = track_nodes(tracks);
    let offset = nodes.len();

    nodes.extend(
        distinct_artists(tracks)
            .into_iter()
            .enumerate()
            .map(|(i, artist)| node(offset + i, &artist.id, &artist.name, NodeGroup::Artist)),
    );
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeShape;
    use crate::track::AudioFeatures;

    fn track(id: &str, artists: &[(&str, &str)]) -> TrackFeature {
        TrackFeature::new(id, format!("Track {id}"), AudioFeatures::default())
            .with_artists(artists.iter().map(|(id, name)| ArtistRef::new(*id, *name)).collect())
    }

    #[test]
    fn test_track_nodes_use_input_order() {
        let nodes = track_nodes(&[track("a", &[]), track("b", &[])]);
        assert_eq!(nodes[0].id, 0);
        assert_eq!(nodes[1].guid, "b");
        assert_eq!(nodes[1].group, NodeGroup::Song);
        assert_eq!(nodes[1].shape, NodeShape::Dot);
    }

    #[test]
    fn test_artists_follow_tracks_and_are_deduplicated() {
        let tracks = vec![
            track("t5", &[("x", "Artist X")]),
            track("t6", &[("x", "Artist X"), ("y", "Artist Y")]),
        ];
        let nodes = track_and_artist_nodes(&tracks);

        let guids: Vec<_> = nodes.iter().map(|n| n.guid.as_str()).collect();
        assert_eq!(guids, ["t5", "t6", "x", "y"]);
        assert!(nodes.iter().enumerate().all(|(i, n)| n.id == i));
        assert_eq!(nodes[2].group, NodeGroup::Artist);
        assert_eq!(nodes[3].label, "Artist Y");
    }

    #[test]
    fn test_artist_nodes() {
        let nodes = artist_nodes(&[Artist::new("a1", "One", &["pop"])]);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].shape, NodeShape::Diamond);
    }
}
