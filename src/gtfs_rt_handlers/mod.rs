// Copyright Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Attribution cannot be removed

pub fn parse_protobuf_message(
    bytes: &[u8],
) -> Result<gtfs_realtime::FeedMessage, prost::DecodeError> {
    prost::Message::decode(bytes)
}
